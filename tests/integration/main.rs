//! Integration tests for iconcache

use chrono::DateTime;
use iconcache::platform::{ActivityInfo, ApplicationInfo};
use iconcache::{ComponentName, StaticCatalog, UserHandle};
use image::{Rgba, RgbaImage};

fn solid(seed: u8) -> RgbaImage {
    RgbaImage::from_pixel(8, 8, Rgba([seed, 255 - seed, seed / 2, 255]))
}

/// Install `package` with one activity per class, all labelled by class
fn install(catalog: &StaticCatalog, package: &str, version: i64, classes: &[&str]) {
    let info = ApplicationInfo {
        package: package.to_string(),
        user: UserHandle::SYSTEM,
        label: format!("{} app", package),
        icon: Some(solid(version as u8)),
        version_code: version,
        last_update_time: DateTime::from_timestamp(1_700_000_000 + version, 0).unwrap(),
    };
    let activities = classes
        .iter()
        .enumerate()
        .map(|(i, class)| ActivityInfo {
            component: ComponentName::new(package, format!("{}.{}", package, class)),
            user: UserHandle::SYSTEM,
            label: class.to_string(),
            icon: Some(solid(version as u8 + i as u8 * 40)),
        })
        .collect();
    catalog.install(info, activities);
}

mod cli_tests {
    use super::install;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use iconcache::config::Config;
    use iconcache::{IconCache, IconQuality, ItemInfoWithIcon, StaticCatalog, UserHandle};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn iconcache() -> Command {
        cargo_bin_cmd!("iconcache")
    }

    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn db(&self) -> PathBuf {
            self.dir.path().join("state").join("app_icons.db")
        }

        fn config(&self) -> PathBuf {
            self.dir.path().join("config.toml")
        }

        /// Command pointed at this sandbox's database and config file
        fn cmd(&self) -> Command {
            let mut cmd = iconcache();
            cmd.env_remove("ICONCACHE_DB")
                .env_remove("ICONCACHE_CONFIG")
                .arg("--db")
                .arg(self.db())
                .arg("--config")
                .arg(self.config());
            cmd
        }

        /// Resolve two activities of `com.example` into the database
        fn seed(&self) {
            seed_db(&self.db());
        }
    }

    fn seed_db(db: &Path) {
        let catalog = Arc::new(StaticCatalog::new());
        install(&catalog, "com.example", 1, &["Main", "Settings"]);

        let mut config = Config::default();
        config.cache.db_path = Some(db.to_path_buf());
        let cache = IconCache::open(&config, catalog).unwrap();
        cache.update_icons_for_pkg("com.example", UserHandle::SYSTEM);

        let mut item = ItemInfoWithIcon::package("com.example", UserHandle::SYSTEM);
        cache.get_title_and_icon_for_app(&mut item, IconQuality::High);
        assert_eq!(item.title, "com.example app");
    }

    #[test]
    fn help_displays() {
        iconcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("icon cache"));
    }

    #[test]
    fn version_displays() {
        iconcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("iconcache"));
    }

    #[test]
    fn unknown_command_fails() {
        iconcache().arg("refresh").assert().failure();
    }

    #[test]
    fn list_empty_database() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached icons"));
        assert!(sandbox.db().exists());
    }

    #[test]
    fn list_empty_database_as_json() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn list_seeded_entries() {
        let sandbox = Sandbox::new();
        sandbox.seed();

        sandbox
            .cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("com.example/com.example.Main\t0"))
            .stdout(predicate::str::contains("com.example/com.example.Settings\t0"))
            .stdout(predicate::str::contains("com.example/.\t0"));

        sandbox
            .cmd()
            .args(["list", "--format", "json", "--package", "com.other"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn list_json_carries_titles() {
        let sandbox = Sandbox::new();
        sandbox.seed();

        let output = sandbox
            .cmd()
            .args(["list", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let titles: Vec<&str> = entries
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["title"].as_str())
            .collect();
        assert!(titles.contains(&"Main"));
        assert!(titles.contains(&"Settings"));
    }

    #[test]
    fn stats_plain_counts_entries() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["stats", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("entries=0"));

        sandbox.seed();
        sandbox
            .cmd()
            .args(["stats", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("entries=3"))
            .stdout(predicate::str::contains("packages=1"));
    }

    #[test]
    fn purge_unknown_package() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["purge", "com.missing"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No entries for com.missing"));
    }

    #[test]
    fn purge_removes_package_entries() {
        let sandbox = Sandbox::new();
        sandbox.seed();

        sandbox
            .cmd()
            .args(["purge", "com.example"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 3 entries for com.example"));

        sandbox
            .cmd()
            .args(["stats", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("entries=0"));
    }

    #[test]
    fn purge_other_user_keeps_entries() {
        let sandbox = Sandbox::new();
        sandbox.seed();

        sandbox
            .cmd()
            .args(["purge", "com.example", "--user-serial", "10"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No entries"));

        sandbox
            .cmd()
            .args(["stats", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("entries=3"));
    }

    #[test]
    fn clear_empty_database() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already empty"));
    }

    #[test]
    fn clear_with_yes_removes_everything() {
        let sandbox = Sandbox::new();
        sandbox.seed();

        sandbox
            .cmd()
            .args(["clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared 3 entries"));

        sandbox
            .cmd()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached icons"));
    }

    #[test]
    fn config_path_prints_override() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("[worker]"));
    }

    #[test]
    fn config_init_and_set() {
        let sandbox = Sandbox::new();

        sandbox
            .cmd()
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(sandbox.config().exists());

        sandbox
            .cmd()
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--force"));

        sandbox
            .cmd()
            .args(["config", "set", "icons.icon_size", "96"])
            .assert()
            .success();

        let written = std::fs::read_to_string(sandbox.config()).unwrap();
        assert!(written.contains("icon_size = 96"));
    }

    #[test]
    fn config_set_does_not_persist_db_override() {
        let sandbox = Sandbox::new();
        let transient = sandbox.dir.path().join("transient.db");

        iconcache()
            .env("ICONCACHE_DB", &transient)
            .env_remove("ICONCACHE_CONFIG")
            .arg("--config")
            .arg(sandbox.config())
            .args(["config", "set", "icons.icon_size", "96"])
            .assert()
            .success();

        sandbox
            .cmd()
            .args(["config", "set", "cache.in_memory_cache", "false"])
            .assert()
            .success();

        let written = std::fs::read_to_string(sandbox.config()).unwrap();
        assert!(written.contains("icon_size = 96"));
        assert!(written.contains("in_memory_cache = false"));
        assert!(!written.contains("db_path"));
    }

    #[test]
    fn db_override_still_applies_to_store_commands() {
        let sandbox = Sandbox::new();
        let transient = sandbox.dir.path().join("transient.db");

        iconcache()
            .env("ICONCACHE_DB", &transient)
            .env_remove("ICONCACHE_CONFIG")
            .arg("--config")
            .arg(sandbox.config())
            .args(["stats", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("entries=0"));
        assert!(transient.exists());
    }

    #[test]
    fn config_set_rejects_unknown_key() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "set", "icons.colour", "red"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn invalid_config_file_fails() {
        let sandbox = Sandbox::new();
        std::fs::write(sandbox.config(), "[cache\nbroken").unwrap();
        sandbox.cmd().arg("list").assert().failure();
    }
}

mod engine_tests {
    use super::install;
    use iconcache::config::Config;
    use iconcache::platform::ShortcutInfo;
    use iconcache::{
        BitmapInfo, ComponentName, ForegroundExecutor, IconCache, IconQuality, IconRequestInfo,
        IconRequestQueue, IconStore, ItemInfoWithIcon, PackageCatalog, SqliteIconStore,
        StaticCatalog, UserHandle,
    };
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config() -> Config {
        let mut config = Config::default();
        config.icons.icon_size = 8;
        config.worker.apply_os_priority = false;
        config
    }

    fn main_component() -> ComponentName {
        ComponentName::new("com.example", "com.example.Main")
    }

    fn in_memory(catalog: Arc<StaticCatalog>) -> IconCache {
        IconCache::new(
            Box::new(SqliteIconStore::open_in_memory().unwrap()),
            catalog,
            &config(),
        )
    }

    #[test]
    fn reinstall_refreshes_icon() {
        let catalog = Arc::new(StaticCatalog::new());
        install(&catalog, "com.example", 1, &["Main"]);
        let cache = in_memory(catalog.clone());

        let mut before = ItemInfoWithIcon::application(main_component(), UserHandle::SYSTEM);
        cache.get_title_and_icon(&mut before, IconQuality::High);
        assert_eq!(before.title, "Main");

        install(&catalog, "com.example", 2, &["Main"]);
        cache.update_icons_for_pkg("com.example", UserHandle::SYSTEM);

        let mut after = ItemInfoWithIcon::application(main_component(), UserHandle::SYSTEM);
        cache.get_title_and_icon(&mut after, IconQuality::High);
        assert_eq!(after.title, "Main");
        assert_ne!(
            before.bitmap.as_ref().and_then(|b| b.icon()),
            after.bitmap.as_ref().and_then(|b| b.icon())
        );
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let mut config = config();
        config.cache.db_path = Some(dir.path().join("icons.db"));

        let catalog = Arc::new(StaticCatalog::new());
        install(&catalog, "com.example", 1, &["Main"]);

        {
            let cache = IconCache::open(&config, catalog.clone()).unwrap();
            let mut item = ItemInfoWithIcon::application(main_component(), UserHandle::SYSTEM);
            cache.get_title_and_icon(&mut item, IconQuality::High);
            assert_eq!(cache.resolution_count(), 1);
        }

        let cache = IconCache::open(&config, catalog).unwrap();
        let mut item = ItemInfoWithIcon::application(main_component(), UserHandle::SYSTEM);
        cache.get_title_and_icon(&mut item, IconQuality::High);
        assert_eq!(item.title, "Main");
        assert_eq!(cache.resolution_count(), 0);

        let store = SqliteIconStore::open(&dir.path().join("icons.db")).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn bulk_matches_single_lookups() {
        let catalog = Arc::new(StaticCatalog::new());
        install(&catalog, "com.example", 1, &["Main", "Settings"]);
        install(&catalog, "com.other", 3, &["Main"]);

        let components = [
            main_component(),
            ComponentName::new("com.example", "com.example.Settings"),
            ComponentName::new("com.other", "com.other.Main"),
            main_component(),
        ];

        let single = in_memory(catalog.clone());
        let expected: Vec<_> = components
            .iter()
            .map(|c| {
                let mut item = ItemInfoWithIcon::application(c.clone(), UserHandle::SYSTEM);
                single.get_title_and_icon_with(
                    &mut item,
                    || catalog.resolve_activity(c, UserHandle::SYSTEM),
                    false,
                    IconQuality::High,
                );
                (item.title, item.bitmap.map(|b| b.color()))
            })
            .collect();

        let bulk = in_memory(catalog.clone());
        let mut items: Vec<_> = components
            .iter()
            .map(|c| ItemInfoWithIcon::application(c.clone(), UserHandle::SYSTEM))
            .collect();
        bulk.get_titles_and_icons_in_bulk(
            items
                .iter_mut()
                .map(|item| IconRequestInfo::new(item, IconQuality::High))
                .collect(),
        );

        let actual: Vec<_> = items
            .into_iter()
            .map(|item| (item.title, item.bitmap.map(|b| b.color())))
            .collect();
        assert_eq!(actual, expected);
        assert_eq!(bulk.resolution_count(), 3);
    }

    #[test]
    fn shortcut_is_badged_with_app_icon() {
        let catalog = Arc::new(StaticCatalog::new());
        install(&catalog, "com.example", 1, &["Main"]);
        let cache = in_memory(catalog);

        let shortcut = ShortcutInfo {
            id: "compose".to_string(),
            package: "com.example".to_string(),
            user: UserHandle::SYSTEM,
            activity: Some(main_component()),
            short_label: "Compose".to_string(),
            long_label: None,
            icon: Some(super::solid(90)),
        };

        let mut unbadged = ItemInfoWithIcon::workspace(None, UserHandle::SYSTEM);
        cache.get_unbadged_shortcut_icon(&mut unbadged, &shortcut);
        let mut badged = ItemInfoWithIcon::workspace(None, UserHandle::SYSTEM);
        cache.get_shortcut_icon(&mut badged, &shortcut);

        let unbadged = unbadged.bitmap.unwrap();
        let badged = badged.bitmap.unwrap();
        assert!(!cache.is_default_icon(&badged, UserHandle::SYSTEM));
        assert_ne!(unbadged.icon(), badged.icon());
    }

    #[tokio::test]
    async fn queue_upgrades_low_res_item() {
        let catalog = Arc::new(StaticCatalog::new());
        install(&catalog, "com.example", 1, &["Main"]);
        let cache = Arc::new(in_memory(catalog));

        let mut item = ItemInfoWithIcon::application(main_component(), UserHandle::SYSTEM);
        item.bitmap = Some(BitmapInfo::low_res(0));

        let mut executor = ForegroundExecutor::new();
        let queue = IconRequestQueue::new(cache, executor.handle(), &config().worker).unwrap();
        let delivered = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&delivered);
        queue.update_icon_in_background(
            move |item: ItemInfoWithIcon| *sink.lock() = Some(item),
            item,
        );

        tokio::time::timeout(Duration::from_secs(5), executor.run_next())
            .await
            .unwrap();

        let item = delivered.lock().take().unwrap();
        assert!(!item.uses_low_res_icon());
        assert_eq!(queue.pending(), 0);
    }
}
