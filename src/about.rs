//! Package identity.
//!
//! Static metadata describing the groundhog package, read by the `info`
//! command and by anything that needs to publish the package (index entries,
//! release notes).

use serde::Serialize;

pub const TITLE: &str = "groundhog";
pub const DESCRIPTION: &str = "Groundhog - A general-purpose geotechnical package";
pub const VERSION: &str = "0.6.0";
pub const AUTHOR: &str = "Bruno Stuyts";
pub const AUTHOR_EMAIL: &str = "bruno@pro-found.be";
pub const LICENSE: &str = "Creative Commons NC-BY-SA 4.0";
pub const URL: &str = "https://github.com/snakesonabrain/groundhog";
pub const DOWNLOAD_URL: &str = "https://github.com/snakesonabrain/groundhog/archive/master.zip";

/// Source revision the binary was built from (`git describe`), or "unknown".
pub const GIT_REVISION: &str = env!("GROUNDHOG_GIT_REVISION");

/// All identity fields in one serializable record.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PackageInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub author_email: &'static str,
    pub license: &'static str,
    pub url: &'static str,
    pub download_url: &'static str,
}

pub fn package_info() -> PackageInfo {
    PackageInfo {
        title: TITLE,
        description: DESCRIPTION,
        version: VERSION,
        author: AUTHOR,
        author_email: AUTHOR_EMAIL,
        license: LICENSE,
        url: URL,
        download_url: DOWNLOAD_URL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_match_expected_literals() {
        assert_eq!(TITLE, "groundhog");
        assert_eq!(
            DESCRIPTION,
            "Groundhog - A general-purpose geotechnical package"
        );
        assert_eq!(VERSION, "0.6.0");
        assert_eq!(AUTHOR, "Bruno Stuyts");
        assert_eq!(AUTHOR_EMAIL, "bruno@pro-found.be");
        assert_eq!(LICENSE, "Creative Commons NC-BY-SA 4.0");
        assert_eq!(URL, "https://github.com/snakesonabrain/groundhog");
        assert_eq!(
            DOWNLOAD_URL,
            "https://github.com/snakesonabrain/groundhog/archive/master.zip"
        );
    }

    #[test]
    fn test_constants_are_not_empty() {
        for value in [
            TITLE,
            DESCRIPTION,
            VERSION,
            AUTHOR,
            AUTHOR_EMAIL,
            LICENSE,
            URL,
            DOWNLOAD_URL,
            GIT_REVISION,
        ] {
            assert!(!value.trim().is_empty());
        }
    }

    #[test]
    fn test_version_matches_cargo_manifest() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_download_url_points_into_repository() {
        assert!(DOWNLOAD_URL.starts_with(URL));
    }

    #[test]
    fn test_package_info_serialization() {
        let info = package_info();
        let json = serde_json::to_value(&info).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 8);
        assert_eq!(json["version"], "0.6.0");
        assert_eq!(json["author_email"], "bruno@pro-found.be");
        assert_eq!(json["license"], LICENSE);
    }
}
