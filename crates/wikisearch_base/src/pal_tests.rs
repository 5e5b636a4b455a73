/* 📖 # PAL Comprehensive Test Suite

These tests run the same scenarios against MockPal and RealPal to make sure the
handler sees identical behavior from both: directory detection, file reads and
the NotFound classification the 404 path relies on.
*/

#[cfg(test)]
mod pal_trait_tests {
    use crate::error::ErrorKind;
    use crate::pal::{FilePath, MockPal, Pal, PalHandle, RealPal};
    use std::fs;
    use tempfile::TempDir;

    fn site_files() -> Vec<(&'static str, &'static [u8])> {
        vec![
            ("index.html", b"<h1>home</h1>"),
            ("reports/index.html", b"<h1>reports</h1>"),
            ("reports/q3.txt", b"q3 numbers"),
        ]
    }

    fn mock_site() -> PalHandle {
        let mock = MockPal::new();
        for (path, content) in site_files() {
            mock.add_file(FilePath::from(path), content.to_vec());
        }
        PalHandle::new(mock)
    }

    fn real_site() -> (TempDir, PalHandle) {
        let temp_dir = TempDir::new().unwrap();
        for (path, content) in site_files() {
            let target = temp_dir.path().join(path);
            fs::create_dir_all(target.parent().unwrap()).unwrap();
            fs::write(target, content).unwrap();
        }
        let pal = PalHandle::new(RealPal::new(temp_dir.path().to_path_buf()));
        (temp_dir, pal)
    }

    fn assert_site_behavior(pal: &PalHandle) {
        assert!(pal.is_directory(&FilePath::from("reports")).unwrap());
        assert!(!pal.is_directory(&FilePath::from("index.html")).unwrap());
        assert!(pal.file_exists(&FilePath::from("reports/q3.txt")).unwrap());
        assert_eq!(
            pal.read_file_to_string(&FilePath::from("reports/index.html"))
                .unwrap(),
            "<h1>reports</h1>"
        );

        let err = pal.read_file(&FilePath::from("missing.html")).err().unwrap();
        match err.kind() {
            ErrorKind::FileError { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            _ => panic!("Expected FileError variant"),
        }
    }

    #[test]
    fn test_mock_pal_site_behavior() {
        assert_site_behavior(&mock_site());
    }

    #[test]
    fn test_real_pal_site_behavior() {
        let (_temp_dir, pal) = real_site();
        assert_site_behavior(&pal);
    }

    #[test]
    fn test_read_file_to_string_invalid_utf8() {
        let mock = MockPal::new();
        mock.add_file(FilePath::from("bad.txt"), vec![0xFF, 0xFE]);

        let result = mock.read_file_to_string(&FilePath::from("bad.txt"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("bad.txt"));
    }

    #[test]
    fn test_pal_handle_shared_across_threads() {
        let pal = mock_site();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pal = pal.clone();
                std::thread::spawn(move || {
                    pal.read_file_to_string(&FilePath::from("index.html"))
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "<h1>home</h1>");
        }
    }
}
