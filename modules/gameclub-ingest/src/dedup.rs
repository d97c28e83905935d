use std::collections::HashSet;

use gameclub_common::Candidate;
use tracing::debug;

/// Drop every candidate whose name or media reference was already seen
/// earlier in the sequence. First occurrence wins and order is preserved.
///
/// Names are compared trimmed, otherwise byte-for-byte (no case folding).
pub fn dedup_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut seen_refs: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let name = candidate.name.trim();
        if seen_names.contains(name) || seen_refs.contains(&candidate.media_ref) {
            debug!(
                name,
                media_ref = candidate.media_ref.as_str(),
                "Skipping duplicate candidate"
            );
            continue;
        }
        seen_names.insert(name.to_string());
        seen_refs.insert(candidate.media_ref.clone());
        kept.push(candidate);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(name: &str, media_ref: &str) -> Candidate {
        Candidate {
            name: name.to_string(),
            media_ref: media_ref.to_string(),
        }
    }

    #[test]
    fn first_occurrence_of_a_name_wins() {
        let out = dedup_candidates(vec![
            c("烽火地带", "https://df.example/a.png"),
            c("烽火地带", "https://df.example/b.png"),
        ]);
        assert_eq!(out, vec![c("烽火地带", "https://df.example/a.png")]);
    }

    #[test]
    fn shared_media_ref_is_a_collision() {
        let out = dedup_candidates(vec![
            c("M4A1", "https://df.example/gun.png"),
            c("AK47", "https://df.example/gun.png"),
            c("AWM", "https://df.example/awm.png"),
        ]);
        let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["M4A1", "AWM"]);
    }

    #[test]
    fn order_of_first_appearance_is_preserved() {
        let out = dedup_candidates(vec![
            c("c", "3"),
            c("a", "1"),
            c("c", "4"),
            c("b", "2"),
        ]);
        let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let out = dedup_candidates(vec![c("Ak47", "1"), c("AK47", "2")]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn surrounding_whitespace_does_not_hide_duplicates() {
        let out = dedup_candidates(vec![c("天海", "1"), c(" 天海 ", "2")]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(dedup_candidates(Vec::new()).is_empty());
    }
}
