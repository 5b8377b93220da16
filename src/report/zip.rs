use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Bundles `files` from `report_dir` into `<out_dir>/<name>_lineage.zip`.
///
/// The archive is written to a temporary name first and renamed on success.
pub fn write_zip(out_dir: &Path, report_dir: &Path, name: &str, files: &[&str]) -> Result<()> {
    let root = format!("{}_lineage", name);
    let zip_name = format!("{}_lineage.zip", name);
    let zip_path = out_dir.join(&zip_name);
    let tmp_path = out_dir.join(format!("{}.tmp", zip_name));

    let file = File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let result = write_zip_entries(&mut zip, report_dir, &root, files);

    match result.and_then(|_| zip.finish().with_context(|| "failed to finalize zip")) {
        Ok(_) => {
            fs::rename(&tmp_path, &zip_path)
                .with_context(|| format!("failed to move zip to {}", zip_path.display()))?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

fn write_zip_entries(
    zip: &mut ZipWriter<File>,
    report_dir: &Path,
    root: &str,
    files: &[&str],
) -> Result<()> {
    let epoch = zip::DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
        .map_err(|e| anyhow::anyhow!("invalid zip timestamp: {e}"))?;
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(epoch);

    zip.add_directory(format!("{}/", root), options)
        .with_context(|| "failed to add directory entry to zip")?;

    for name in files {
        let src_path = report_dir.join(name);
        let zip_path = format!("{}/{}", root, name);
        add_file(zip, &src_path, &zip_path, options)
            .with_context(|| format!("failed to add {} to zip", name))?;
    }
    Ok(())
}

fn add_file(
    zip: &mut ZipWriter<File>,
    src_path: &Path,
    zip_path: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let mut file =
        File::open(src_path).with_context(|| format!("failed to open {}", src_path.display()))?;
    zip.start_file(zip_path, options)?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        zip.write_all(&buf[..n])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn bundles_requested_files() {
        let dir = TempDir::new().unwrap();
        let report = dir.path().join("s1_lineage");
        fs::create_dir_all(&report).unwrap();
        fs::write(report.join("a.html"), "<html></html>").unwrap();
        fs::write(report.join("b.svg"), "<svg/>").unwrap();
        write_zip(dir.path(), &report, "s1", &["a.html", "b.svg"]).unwrap();

        let zip_path = dir.path().join("s1_lineage.zip");
        assert!(zip_path.is_file());
        assert!(!dir.path().join("s1_lineage.zip.tmp").exists());
        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut body = String::new();
        archive
            .by_name("s1_lineage/b.svg")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "<svg/>");
    }

    #[test]
    fn missing_file_leaves_no_partial_archive() {
        let dir = TempDir::new().unwrap();
        assert!(write_zip(dir.path(), dir.path(), "s2", &["nope.html"]).is_err());
        assert!(!dir.path().join("s2_lineage.zip").exists());
        assert!(!dir.path().join("s2_lineage.zip.tmp").exists());
    }
}
