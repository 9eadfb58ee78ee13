//! CLI integration tests for deskfind commands.
//!
//! Every test isolates HOME and the app directory in temp dirs and points
//! the crawler at a small generated tree.

use std::fs;

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

/// Temp HOME with an app dir whose config crawls `home/root`
struct Env {
    home: assert_fs::TempDir,
}

impl Env {
    fn new() -> Self {
        let home = assert_fs::TempDir::new().unwrap();
        home.child("root/Projects/GL-05_shop_drawing.dwg")
            .write_str("dwg")
            .unwrap();
        home.child("root/Projects/minutes.txt").write_str("text").unwrap();
        home.child("root/node_modules/GL-05.js").write_str("js").unwrap();

        let config = serde_json::json!({ "roots": [home.path().join("root")] });
        home.child("app/config.json")
            .write_str(&config.to_string())
            .unwrap();
        Env { home }
    }

    fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("deskfind").unwrap();
        cmd.env("HOME", self.home.path())
            .env_remove("DESKFIND_HOME")
            .arg("--app-dir")
            .arg(self.home.path().join("app"));
        cmd
    }

    fn feedback_json(&self) -> serde_json::Value {
        let text = fs::read_to_string(self.home.path().join("app/feedback.json")).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

mod index {
    use super::*;

    #[test]
    fn builds_then_reports_fresh() {
        let env = Env::new();

        env.cmd()
            .arg("index")
            .assert()
            .success()
            .stdout(predicate::str::contains("Indexed 2 files"));
        env.home.child("app/index.json").assert(predicate::path::exists());

        env.cmd()
            .arg("index")
            .assert()
            .success()
            .stdout(predicate::str::contains("Index is fresh (2 files)"));

        env.cmd()
            .args(["index", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Indexed 2 files"));
    }
}

mod search {
    use super::*;

    #[test]
    fn finds_file_through_synonym() {
        let env = Env::new();

        env.cmd()
            .args(["search", "GL-05", "預製圖"])
            .assert()
            .success()
            .stdout(predicate::str::contains("GL-05_shop_drawing.dwg"))
            .stdout(predicate::str::contains("GL-05.js").not());
    }

    #[test]
    fn json_output() {
        let env = Env::new();

        let output = env
            .cmd()
            .args(["search", "shop", "drawing", "--format", "json", "--explain"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let first = &results[0];
        assert_eq!(first["item"]["name"], "GL-05_shop_drawing.dwg");
        assert_eq!(first["item"]["action"], "open_file");
        assert!(first["score"].as_f64().unwrap() > 0.0);
        assert_eq!(first["breakdown"]["total"], first["score"]);
    }

    #[test]
    fn no_results() {
        let env = Env::new();

        env.cmd()
            .args(["search", "zzqqxxyy"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No results found for 'zzqqxxyy'"));
    }

    #[test]
    fn blank_query_prints_hint() {
        let env = Env::new();

        env.cmd()
            .args(["search", "   "])
            .assert()
            .success()
            .stdout(predicate::str::contains("Enter some keywords"));
        env.cmd()
            .args(["search", "  ", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::diff("[]\n"));
    }

    #[test]
    fn json_output_with_pick_stays_parseable() {
        let env = Env::new();
        env.home
            .child("app/memory.json")
            .write_str(r#"[{"description": "zebra archive", "path": "/nonexistent/zebra", "action": "open_url"}]"#)
            .unwrap();

        let output = env
            .cmd()
            .args(["search", "zebra", "--format", "json", "--pick", "1", "--no-index"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(results.as_array().unwrap().len(), 1);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Could not open /nonexistent/zebra"));
    }

    #[test]
    fn extension_match_flag() {
        let env = Env::new();
        let extension_factor = |policy: &str| {
            let output = env
                .cmd()
                .args(["search", "autocad", "--format", "json", "--explain"])
                .args(["--extension-match", policy])
                .output()
                .unwrap();
            assert!(output.status.success());
            let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
            assert_eq!(results[0]["item"]["name"], "GL-05_shop_drawing.dwg");
            results[0]["breakdown"]["extension"].as_f64().unwrap()
        };

        assert_eq!(extension_factor("expanded"), 1.2);
        assert_eq!(extension_factor("literal"), 1.0);

        env.cmd()
            .args(["search", "autocad", "--extension-match", "fuzzy"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown extension match policy"));
    }

    #[test]
    fn requires_a_query() {
        let env = Env::new();
        env.cmd().arg("search").assert().failure();
    }

    #[test]
    fn pick_out_of_range_fails() {
        let env = Env::new();

        env.cmd()
            .args(["search", "shop", "--pick", "99"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Pick must be between"));
    }

    #[test]
    fn failed_open_records_rejection() {
        let env = Env::new();
        env.home
            .child("app/memory.json")
            .write_str(
                r#"[{"description": "zebra archive", "path": "/nonexistent/zebra", "action": "open_url"}]"#,
            )
            .unwrap();

        env.cmd()
            .args(["search", "zebra", "--pick", "1", "--no-index"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Could not open /nonexistent/zebra"));

        let feedback = env.feedback_json();
        assert_eq!(feedback["item_bias"]["/nonexistent/zebra"]["neg"], 1);
        assert_eq!(feedback["token_bias"]["zebra"]["neg"], 1);
        env.home
            .child("app/index.json")
            .assert(predicate::path::missing());
    }
}

mod feedback {
    use super::*;

    #[test]
    fn record_status_and_reset() {
        let env = Env::new();

        env.cmd()
            .args(["feedback", "GL-05 預製圖", "/srv/GL-05.dwg"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Recorded acceptance"));
        env.cmd()
            .args(["feedback", "GL-05", "/srv/GL-05.dwg", "--reject"])
            .assert()
            .success();

        let feedback = env.feedback_json();
        assert_eq!(feedback["item_bias"]["/srv/GL-05.dwg"]["pos"], 1);
        assert_eq!(feedback["item_bias"]["/srv/GL-05.dwg"]["neg"], 1);
        assert_eq!(feedback["token_bias"]["gl"]["pos"], 1);

        let output = env
            .cmd()
            .args(["status", "--format", "json"])
            .output()
            .unwrap();
        let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(status["feedback"]["state"], "ok");
        assert_eq!(status["feedback"]["items"], 1);

        env.cmd().arg("reset-feedback").assert().success();

        let output = env
            .cmd()
            .args(["status", "--format", "json"])
            .output()
            .unwrap();
        let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(status["feedback"]["items"], 0);
        assert_eq!(status["feedback"]["tokens"], 0);
    }

    #[test]
    fn status_reports_corrupt_file() {
        let env = Env::new();
        env.home
            .child("app/feedback.json")
            .write_str("{ nope")
            .unwrap();

        env.cmd()
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("corrupt"));
    }
}

#[test]
fn version_flag() {
    #[allow(deprecated)]
    Command::cargo_bin("deskfind")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("deskfind"));
}
