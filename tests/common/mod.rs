#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    // Global counter and lock for thread-safe temporary file creation
    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);
    static TEMP_LOCK: Mutex<()> = Mutex::new(());

    /// Creates a configuration file with a unique name and the given extension
    pub fn create_temp_config(content: &str, ext: &str) -> PathBuf {
        let _lock = TEMP_LOCK.lock().unwrap();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();

        let path = std::env::temp_dir().join(format!(
            "actr_test_{}_{}_{}.{}",
            std::process::id(),
            counter,
            nanos,
            ext
        ));

        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn create_temp_yaml(content: &str) -> PathBuf {
        create_temp_config(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> PathBuf {
        create_temp_config(content, "json")
    }

    pub fn create_temp_toml(content: &str) -> PathBuf {
        create_temp_config(content, "toml")
    }

    /// Cleanup temporary files (best effort)
    pub fn cleanup_temp_files(paths: &[PathBuf]) {
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }
}

pub mod packages {
    use actionroute::config::{
        ActionConfig, PackageConfig, ResultConfig, ResultTypeConfig,
    };

    /// Abstract root package with a `dispatcher` result type as its default.
    pub fn base() -> PackageConfig {
        PackageConfig::new("base")
            .abstract_package(true)
            .result_type(ResultTypeConfig::new("dispatcher", "DispatcherResult"))
            .result_type(ResultTypeConfig::new("redirect", "RedirectResult"))
            .default_result_type("dispatcher")
    }

    /// Concrete package under `namespace` extending [`base`].
    pub fn package(name: &str, namespace: &str) -> PackageConfig {
        PackageConfig::new(name).namespace(namespace).parent("base")
    }

    /// Action with a class and a `success` result.
    pub fn action(name: &str, class_name: &str) -> ActionConfig {
        ActionConfig::new(name)
            .class(class_name)
            .result(ResultConfig::new("success"))
    }
}
