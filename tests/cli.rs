#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn iprd(data: &TempDir) -> Command {
        let mut cmd = Command::cargo_bin("iprd").unwrap();
        cmd.env_remove("IPRD_USER")
            .env_remove("IPRD_ROLE")
            .env("IPRD_DATA_DIR", data.path())
            .env("RUST_LOG", "off");
        cmd
    }

    #[test]
    fn signed_out_users_are_turned_away() {
        let data = TempDir::new().unwrap();
        iprd(&data)
            .arg("list")
            .assert()
            .failure()
            .stderr(predicate::str::contains("sign in first"));
    }

    #[test]
    fn list_shows_the_built_in_library() {
        let data = TempDir::new().unwrap();
        iprd(&data)
            .args(["--user", "asha", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Drip Irrigation Demonstration"))
            .stdout(predicate::str::contains("page 1 of 1 (6 results)"));
    }

    #[test]
    fn viewers_cannot_open_reports() {
        let data = TempDir::new().unwrap();
        iprd(&data)
            .args(["--user", "v", "--role", "viewer", "report"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Viewer cannot open Reports; try Search"));
    }

    #[test]
    fn search_exports_csv() {
        let data = TempDir::new().unwrap();
        iprd(&data)
            .args(["-u", "asha", "search", "--department", "Health", "--format", "csv"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with(
                "Title,Department,District,Block,Content Type,Upload Date,Tags,Source",
            ))
            .stdout(predicate::str::contains("\"Mobile Health Camp Launch\""))
            .stdout(predicate::str::contains("Drip Irrigation").not());
    }

    #[test]
    fn upload_tag_clip_and_share() {
        let data = TempDir::new().unwrap();
        let files = TempDir::new().unwrap();
        let video = files.path().join("fair.mp4");
        std::fs::write(&video, b"frames").unwrap();

        let output = iprd(&data)
            .args(["-u", "asha", "--role", "Staff", "upload"])
            .arg(&video)
            .args(["--name", "Innovation fair", "--department", "Agriculture"])
            .assert()
            .success()
            .stdout(predicate::str::contains("(Video, Raw)"))
            .get_output()
            .stdout
            .clone();
        let stdout = String::from_utf8(output).unwrap();
        let id = stdout
            .split('#')
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .expect("upload prints the new id")
            .to_string();

        iprd(&data)
            .args(["-u", "asha", "tag", id.as_str(), "--add", "00:00:05,00:00:20,Innovation"])
            .assert()
            .success()
            .stdout(predicate::str::contains("now Final"));

        iprd(&data)
            .args(["-u", "asha", "clip", id.as_str(), "0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("00:00:05 - 00:00:20 (00:00:15)"));

        iprd(&data)
            .args([
                "-u", "asha", "share", "--department", "Agriculture", "--person", "Ravi",
                "--email", "ravi@example.org", "--mobile", "9876543210",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Video clip (00:00:05 - 00:00:20) shared with Ravi"));

        iprd(&data)
            .args(["-u", "admin", "audit"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Upload"))
            .stdout(predicate::str::contains("Tag"))
            .stdout(predicate::str::contains("[00:00:05-00:00:20]"));
    }

    #[test]
    fn invalid_share_is_rejected() {
        let data = TempDir::new().unwrap();
        iprd(&data)
            .args([
                "-u", "asha", "share", "--department", "Health", "--person", "Ravi",
                "--file", "report.pdf", "--email", "not-an-email", "--mobile", "9876543210",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("valid email"));
    }

    #[test]
    fn interactive_search_applies_only_the_settled_text() {
        let data = TempDir::new().unwrap();
        iprd(&data)
            .args(["-u", "asha", "search", "--interactive"])
            .write_stdin("irr\nirrigation\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("> irrigation"))
            .stdout(predicate::str::contains("> irr\n").not());
    }

    #[test]
    fn print_writes_escaped_html() {
        let data = TempDir::new().unwrap();
        let out = data.path().join("preview.html");
        iprd(&data)
            .args(["-u", "asha", "print", "1", "--output"])
            .arg(&out)
            .assert()
            .success();
        let html = std::fs::read_to_string(out).unwrap();
        assert!(html.contains("<h1>Drip Irrigation Demonstration</h1>"));
    }
}
