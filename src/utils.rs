//! # Utility Functions Module
//!
//! Helpers for building external tool command lines.

/// Builds a `Vec<OsString>` of command arguments from mixed `&str`, `String`
/// and `Path` values.
///
/// Paths go through untouched, so non UTF-8 file names reach ffmpeg intact.
///
/// # Example
/// ```rust,ignore
/// let filter = plan.to_string();
/// let args = args!["-i", input_path, "-vf", filter, "-y", output_path];
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        vec![$(::std::ffi::OsStr::new(&$item).to_os_string()),*]
    };
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::Path;

    #[test]
    fn test_args_macro_mixed_types() {
        let filter = format!("scale={}:{}", 960, 720);
        let input = Path::new("/videos/clip.mp4");
        let result = crate::args!["-i", input, "-vf", filter];
        let expected: Vec<OsString> = ["-i", "/videos/clip.mp4", "-vf", "scale=960:720"]
            .into_iter()
            .map(OsString::from)
            .collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_args_macro_empty() {
        let result: Vec<OsString> = crate::args![];
        assert!(result.is_empty());
    }
}
