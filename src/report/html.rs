use crate::core::model::EventKind;
use crate::core::palette::{Series, event_color};
use crate::core::panels::Session;
use crate::core::scene::Scene;
use crate::core::view::{ScaleMode, TopNormalization, ViewState};
use crate::report::svg::{self, escape_svg};
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Writes a standalone page holding every view the controls can reach.
pub fn write(path: &Path, session: &Session, title: &str) -> Result<()> {
    let html = render(session, title)?;
    let mut w =
        BufWriter::new(File::create(path).with_context(|| "create lineage_report.html failed")?);
    w.write_all(html.as_bytes())?;
    w.flush()?;
    Ok(())
}

/// Walks a copy of the session through every control state.
///
/// Each top-N value is selected, then the three toggles are flipped one at a
/// time in Gray-code order so all eight scale combinations are visited.
pub fn all_views(session: &Session) -> Result<Vec<(ViewState, Scene)>> {
    let mut walker = session.clone();
    let mut out = Vec::with_capacity(session.menu().len() * 8);
    for &top_n in session.menu() {
        let scene = walker.select_top_n(top_n)?;
        out.push((walker.view(), scene));
        for step in 1..8u32 {
            let scene = match step.trailing_zeros() {
                0 => walker.toggle_top_scale(),
                1 => walker.toggle_right_scale(),
                _ => walker.toggle_normalization(),
            };
            out.push((walker.view(), scene));
        }
    }
    Ok(out)
}

pub fn render(session: &Session, title: &str) -> Result<String> {
    let data = session.data();
    let initial = session.view();
    let mut html = String::with_capacity(512 * 1024);
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(
        html,
        "<title>Lineage edit plot: {}</title>",
        escape_svg(title)
    )?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}}"
    )?;
    writeln!(html, "h1{{margin:0 0 8px 0;font-size:22px;}}")?;
    writeln!(
        html,
        ".meta{{color:#555;font-size:12px;margin-bottom:12px;}}"
    )?;
    writeln!(
        html,
        ".controls{{display:flex;gap:8px;align-items:center;margin:8px 0 12px 0;font-size:13px;}}"
    )?;
    writeln!(html, ".controls button{{padding:4px 10px;}}")?;
    writeln!(html, ".legend span{{display:inline-block;width:14px;height:10px;margin:0 4px 0 10px;border:1px solid #999;}}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;

    writeln!(html, "<h1>Lineage edit plot</h1>")?;
    writeln!(
        html,
        "<div class=\"meta\">Sample: <b>{}</b><br/>HMIDs: {} &middot; read blocks: {} &middot; intervals: {}<br/>Generated: unix {}</div>",
        escape_svg(title),
        data.occurrences.len(),
        data.read_blocks.len(),
        data.interval_count(),
        ts
    )?;

    writeln!(html, "<div class=\"controls\">")?;
    writeln!(
        html,
        "<button type=\"button\" onclick=\"logTheTop()\">Top: log / linear</button>"
    )?;
    writeln!(
        html,
        "<button type=\"button\" onclick=\"scaleToHundred()\">Top: max / 100%</button>"
    )?;
    writeln!(
        html,
        "<button type=\"button\" onclick=\"changeHistogram()\">Right: log / linear</button>"
    )?;
    writeln!(
        html,
        "<label for=\"topX\">Top HMIDs</label><select id=\"topX\" onchange=\"changeSelection()\">"
    )?;
    for &n in session.menu() {
        let selected = if n == initial.top_n {
            " selected"
        } else {
            ""
        };
        writeln!(html, "<option value=\"{}\"{}>{}</option>", n, selected, n)?;
    }
    writeln!(html, "</select>")?;
    writeln!(html, "</div>")?;
    legend(&mut html)?;

    writeln!(html, "<div id=\"left\">")?;
    for (view, scene) in all_views(session)? {
        let hidden = if view == initial { "" } else { " hidden" };
        writeln!(
            html,
            "<div class=\"view\" id=\"view-{}\"{}>",
            view.slug(),
            hidden
        )?;
        html.push_str(&svg::render(&scene)?);
        writeln!(html, "</div>")?;
    }
    writeln!(html, "</div>")?;

    html.push_str("<script>");
    write!(
        html,
        "var state={{top:'{}',right:'{}',norm:'{}',n:{}}};",
        initial.top_scale.as_str(),
        initial.right_scale.as_str(),
        initial.normalization.as_str(),
        initial.top_n
    )?;
    write!(
        html,
        "function flip(v,a,b){{return v===a?b:a;}}\
function redrawAll(){{document.querySelectorAll('.view').forEach(function(e){{e.hidden=true;}});\
var el=document.getElementById('view-top-'+state.top+'_right-'+state.right+'_'+state.norm+'_n'+state.n);\
if(el){{el.hidden=false;}}}}\
function logTheTop(){{state.top=flip(state.top,'{lin}','{log}');redrawAll();}}\
function changeHistogram(){{state.right=flip(state.right,'{lin}','{log}');redrawAll();}}\
function scaleToHundred(){{state.norm=flip(state.norm,'{max}','{fixed}');redrawAll();}}\
function changeSelection(){{var e=document.getElementById('topX');state.n=+e.options[e.selectedIndex].value;redrawAll();}}",
        lin = ScaleMode::Linear.as_str(),
        log = ScaleMode::Log.as_str(),
        max = TopNormalization::ObservedMax.as_str(),
        fixed = TopNormalization::Fixed100.as_str(),
    )?;
    html.push_str("</script>");
    writeln!(html, "</body></html>")?;
    Ok(html)
}

fn legend(out: &mut String) -> Result<()> {
    out.push_str("<div class=\"legend\"><b>Events:</b>");
    for code in 0..=4u8 {
        let event = EventKind::from_code(code)?;
        write!(
            out,
            "<span style=\"background:{}\"></span>{}",
            event_color(event),
            event.as_str()
        )?;
    }
    writeln!(
        out,
        "<span style=\"background:{}\"></span>{}</div>",
        Series::Uncovered.color(),
        Series::Uncovered.as_str()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{LoadedData, Occurrence, PerBaseRow, ReadBlock};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn data() -> LoadedData {
        LoadedData {
            per_base: vec![
                PerBaseRow {
                    index: 0,
                    reference: None,
                    deletion: 0.1,
                    insertion: 0.0,
                    scar: 0.0,
                    uncovered: 0.0,
                },
                PerBaseRow {
                    index: 10,
                    reference: None,
                    deletion: 0.2,
                    insertion: 0.1,
                    scar: 0.0,
                    uncovered: 0.0,
                },
            ],
            cut_sites: Vec::new(),
            intervals: None,
            occurrences: vec![Occurrence {
                array: 0,
                raw_count: 12.0,
                color: "#123456".to_string(),
                membership: Vec::new(),
            }],
            read_blocks: vec![ReadBlock {
                array: 0,
                start: 0,
                end: 10,
                event: EventKind::Deletion,
            }],
        }
    }

    fn session() -> Session {
        let initial = ViewState {
            top_n: 10,
            ..ViewState::default()
        };
        Session::new(Arc::new(data()), initial, vec![10, 200]).unwrap()
    }

    #[test]
    fn walk_visits_each_state_once_and_matches_redraw() {
        let s = session();
        let views = all_views(&s).unwrap();
        assert_eq!(views.len(), 16);
        let slugs: HashSet<String> = views.iter().map(|(v, _)| v.slug()).collect();
        assert_eq!(slugs.len(), 16);
        for (view, scene) in &views {
            let direct = Session::new(Arc::new(data()), *view, vec![view.top_n]).unwrap();
            assert_eq!(*scene, direct.redraw());
        }
        // the caller's session is left untouched
        assert_eq!(s.view(), ViewState { top_n: 10, ..ViewState::default() });
    }

    #[test]
    fn one_view_per_control_combination() {
        let html = render(&session(), "sample <1>").unwrap();
        assert_eq!(html.matches("class=\"view\"").count(), 16);
        assert_eq!(html.matches("class=\"view\" id=").count() - html.matches(" hidden>").count(), 1);
        assert!(html.contains("id=\"view-top-linear_right-log_max_n10\">"));
        assert!(html.contains("<select id=\"topX\""));
        assert!(html.contains("<option value=\"10\" selected>10</option>"));
        assert!(html.contains("sample &lt;1&gt;"));
        assert!(html.contains("function logTheTop()"));
        assert!(html.contains("</span>scar<span"));
    }
}
