//! Common utilities for integration tests

use std::fs;
use std::path::{Path, PathBuf};

use quesuene::Pactl;
use tempfile::TempDir;

/// Two streams in the layout `pactl list sink-inputs` prints.
pub const TWO_STREAMS: &str = r#"Sink Input #2
	Driver: protocol-native.c
	Volume: front-left: 52429 /  80% / -5.81 dB,   front-right: 52429 /  80% / -5.81 dB
	        balance 0.00
	Properties:
		application.name = "Call"

Sink Input #5
	Driver: protocol-native.c
	Volume: front-left: 26214 /  40% / -23.88 dB,   front-right: 26214 /  40% / -23.88 dB
	        balance 0.00
	Properties:
		application.name = "Music"
"#;

/// A stand-in for pactl living in its own temporary directory.
pub struct FakePactl {
    pub dir: TempDir,
    pub script: PathBuf,
    pub log: PathBuf,
}

impl FakePactl {
    /// Script that records its arguments and environment, prints `stdout`
    /// and exits with `exit_code`.
    pub fn new(stdout: &str, exit_code: i32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("pactl");
        let log = dir.path().join("calls.log");
        let output = dir.path().join("output.txt");

        fs::write(&output, stdout).unwrap();
        fs::write(
            &script,
            format!(
                "echo \"LC_ALL=$LC_ALL $*\" >> '{log}'\ncat '{output}'\necho 'fake pactl error' >&2\nexit {exit_code}\n",
                log = log.display(),
                output = output.display(),
            ),
        )
        .unwrap();

        Self { dir, script, log }
    }

    pub fn pactl(&self) -> Pactl {
        let script = self.script.to_string_lossy();
        Pactl::new(&["sh", &*script]).unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        read_lines(&self.log)
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|contents| contents.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
