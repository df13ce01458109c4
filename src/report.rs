use std::path::PathBuf;

use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Default, Clone, Serialize)]
pub struct Report {
    pub scanned: usize,
    pub normalized: usize,
    pub untagged: usize,
    pub sidecars_merged: usize,
    pub walk_errors: usize,
    pub tag_errors: usize,
    pub sidecar_errors: usize,
    pub entry_errors: usize,
    pub depth_skipped_dirs: usize,
    pub depth_skip_paths: Vec<PathBuf>,
}

impl Report {
    pub fn record_scan(&mut self) {
        self.scanned += 1;
    }

    pub fn record_normalized(&mut self) {
        self.normalized += 1;
    }

    pub fn record_untagged(&mut self) {
        self.untagged += 1;
    }

    pub fn record_sidecar_merge(&mut self) {
        self.sidecars_merged += 1;
    }

    pub fn record_walk_error(&mut self) {
        self.walk_errors += 1;
    }

    pub fn record_tag_error(&mut self) {
        self.tag_errors += 1;
    }

    pub fn record_sidecar_error(&mut self) {
        self.sidecar_errors += 1;
    }

    pub fn record_entry_error(&mut self) {
        self.entry_errors += 1;
    }

    pub fn record_depth_skips(&mut self, paths: &[PathBuf]) {
        self.depth_skipped_dirs += paths.len();
        self.depth_skip_paths.extend_from_slice(paths);
    }

    pub fn emit_summary(&self) {
        info!(
            "Scanned {scanned} files -- normalized {normalized}, untagged {untagged}, sidecars merged {merged}, directories at depth limit {depth_skipped}",
            scanned = self.scanned,
            normalized = self.normalized,
            untagged = self.untagged,
            merged = self.sidecars_merged,
            depth_skipped = self.depth_skipped_dirs,
        );

        let failures =
            self.walk_errors + self.tag_errors + self.sidecar_errors + self.entry_errors;
        if failures > 0 {
            warn!(
                "Encountered {walk} traversal errors, {tag} tag read failures, {sidecar} unreadable sidecars and {entry} unwritable entries.",
                walk = self.walk_errors,
                tag = self.tag_errors,
                sidecar = self.sidecar_errors,
                entry = self.entry_errors,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_serialize_into_summary() {
        let mut report = Report::default();
        report.record_scan();
        report.record_scan();
        report.record_normalized();
        report.record_untagged();
        report.record_sidecar_merge();
        report.record_walk_error();
        report.record_tag_error();
        report.record_sidecar_error();
        report.record_entry_error();
        report.record_depth_skips(&[PathBuf::from("deep")]);

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["scanned"], 2);
        assert_eq!(json["normalized"], 1);
        assert_eq!(json["untagged"], 1);
        assert_eq!(json["sidecars_merged"], 1);
        assert_eq!(json["walk_errors"], 1);
        assert_eq!(json["tag_errors"], 1);
        assert_eq!(json["sidecar_errors"], 1);
        assert_eq!(json["entry_errors"], 1);
        assert_eq!(json["depth_skipped_dirs"], 1);
        assert_eq!(json["depth_skip_paths"], serde_json::json!(["deep"]));
    }
}
