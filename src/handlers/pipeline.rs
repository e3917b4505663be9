use crate::generator::{CiPlatform, ProjectType, generate_pipeline};
use std::fs;
use std::io;
use std::path::Path;

pub fn handle_pipeline(
    platform: CiPlatform,
    project: ProjectType,
    no_security: bool,
    output: Option<&Path>,
    force: bool,
) -> crate::Result<()> {
    let pipeline = generate_pipeline(platform, project, !no_security)?;

    let Some(path) = output else {
        print!("{}", pipeline);
        return Ok(());
    };

    if path.exists() && !force {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("refusing to overwrite {} (use --force)", path.display()),
        )
        .into());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, pipeline)?;
    println!(
        "✅ {} pipeline for {} written to {} (usually kept at {})",
        match platform {
            CiPlatform::Gitlab => "GitLab CI",
            CiPlatform::Github => "GitHub Actions",
        },
        project,
        path.display(),
        platform.default_filename()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_into_nested_path_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".github/workflows/ci.yml");
        handle_pipeline(CiPlatform::Github, ProjectType::Golang, false, Some(&path), false).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&written).unwrap();
        assert!(parsed.get("jobs").is_some());

        assert!(handle_pipeline(CiPlatform::Github, ProjectType::Golang, false, Some(&path), false).is_err());
        handle_pipeline(CiPlatform::Github, ProjectType::Golang, true, Some(&path), true).unwrap();
    }
}
