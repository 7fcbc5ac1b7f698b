//! Scenario: delimited rows through the validator and batch processor.

use tsu_ingest::csv_source::parse_csv_str;
use tsu_ingest::{Advisory, BatchProcessor, CsvRecordSource, RecordSource, RejectionReason};
use tsu_schemas::{EntrySlot, PlayerEntity, MAX_ENTRY_SLOTS};

const HEADER: &str = "playerName;playerId;totalEntries;Entry 1;Points 1;Entry 2;Points 2";

fn batch_of(body: &str) -> tsu_ingest::Batch {
    let rows = parse_csv_str(&format!("{HEADER}\n{body}")).unwrap();
    BatchProcessor::new().process(&rows)
}

#[test]
fn alice_row_becomes_expected_entity() {
    let batch = batch_of("Alice;1234567890;2;Red Team;5;Sub Red;3\n");
    assert!(batch.rejections.is_empty());
    assert_eq!(
        batch.entities,
        vec![PlayerEntity {
            player_name: "Alice".to_string(),
            player_id: 1_234_567_890,
            total_entries: 2,
            entries: vec![EntrySlot::new("Red Team", 5), EntrySlot::new("Sub Red", 3)],
        }]
    );
    assert!(batch.entities[0].entries[1].sub);
}

#[test]
fn non_integer_id_is_rejected_and_never_accepted() {
    let batch = batch_of("Bob;abc\n");
    assert!(batch.entities.is_empty());
    assert_eq!(batch.rejections.len(), 1);
    assert_eq!(batch.rejections[0].reason, RejectionReason::InvalidIdentifierFormat);
    assert_eq!(batch.rejections[0].raw_player_id.as_deref(), Some("abc"));
}

#[test]
fn blank_rows_are_skipped_silently() {
    let batch = batch_of(";;;;\n;;\nAlice;1234567890;;;\n");
    assert_eq!(batch.stats.rows_seen, 3);
    assert_eq!(batch.stats.blank_skipped, 2);
    assert_eq!(batch.stats.valid, 1);
    assert_eq!(batch.stats.rejected, 0);
}

#[test]
fn blank_name_with_valid_id_is_rejected() {
    let batch = batch_of(";1234567890;1;;\n");
    assert_eq!(batch.rejections[0].reason, RejectionReason::InvalidPlayerName);
}

#[test]
fn seven_digit_id_is_accepted_with_advisory() {
    let batch = batch_of("Shorty;1234567;0;;\n");
    assert_eq!(batch.stats.valid, 1);
    assert_eq!(batch.stats.advisories, 1);
    assert_eq!(batch.entities[0].player_id, 1_234_567);

    let rows = parse_csv_str(&format!("{HEADER}\nShorty;1234567;0;;\n")).unwrap();
    match tsu_ingest::validate(&rows[0], 1) {
        tsu_ingest::Validation::Accepted(a) => assert_eq!(
            a.advisories,
            vec![Advisory::ShortIdentifier { player_id: 1_234_567 }]
        ),
        other => panic!("expected Accepted, got {other:?}"),
    }
}

#[test]
fn short_id_is_flagged_even_when_the_name_is_blank() {
    let batch = batch_of(";1234567;0;;\n");
    assert_eq!(batch.stats.rejected, 1);
    assert_eq!(batch.stats.advisories, 1);
    assert_eq!(batch.rejections[0].reason, RejectionReason::InvalidPlayerName);
    assert_eq!(
        batch.rejections[0].advisories,
        vec![Advisory::ShortIdentifier { player_id: 1_234_567 }]
    );
}

#[test]
fn total_entries_beyond_store_range_is_rejected_not_written() {
    let batch = batch_of("Big;1234567890;3000000000;;\nMax;1234567891;2147483647;;\n");
    assert_eq!(batch.stats.valid, 1);
    assert_eq!(batch.stats.rejected, 1);
    assert_eq!(batch.rejections[0].reason, RejectionReason::InvalidTotalEntries);
    assert_eq!(batch.rejections[0].row, 1);
    assert_eq!(batch.entities[0].total_entries, tsu_ingest::MAX_TOTAL_ENTRIES);
}

#[test]
fn accepted_entities_respect_bounds_with_full_width_rows() {
    let mut header = vec!["playerName".to_string(), "playerId".into(), "totalEntries".into()];
    let mut cells = vec!["Max".to_string(), "1234567890".into(), "40".into()];
    for i in 1..=MAX_ENTRY_SLOTS {
        header.push(format!("Entry {i}"));
        header.push(format!("Points {i}"));
        cells.push(format!("G{i}"));
        cells.push(i.to_string());
    }
    let csv = format!("{}\n{}\n", header.join(";"), cells.join(";"));
    let batch = BatchProcessor::new().process(&parse_csv_str(&csv).unwrap());

    let e = &batch.entities[0];
    assert_eq!(e.entries.len(), MAX_ENTRY_SLOTS);
    assert_eq!(e.entries[39].group_name, "G40");
    assert_eq!(e.entries[39].score, 40);
}

#[test]
fn mixed_file_partitions_without_aborting() {
    let body = "\
Alice;1234567890;2;Red Team;5;Sub Red;3
Bob;abc;;;
;;;;
Cara;9876543210;-1;;
Dee;5555555555;1;Blue;x;;
";
    let batch = batch_of(body);
    assert_eq!(batch.stats.valid, 2);
    assert_eq!(batch.stats.rejected, 2);
    assert_eq!(batch.stats.blank_skipped, 1);
    let reasons: Vec<_> = batch.rejections.iter().map(|r| (r.row, r.reason)).collect();
    assert_eq!(
        reasons,
        vec![
            (2, RejectionReason::InvalidIdentifierFormat),
            (4, RejectionReason::InvalidTotalEntries)
        ]
    );
    assert_eq!(batch.entities[1].entries[0].score, 0);
}

#[tokio::test]
async fn csv_file_source_feeds_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.csv");
    std::fs::write(&path, format!("\u{feff}{HEADER}\nAlice;1234567890;2;Red Team;5;Sub Red;3\n")).unwrap();

    let rows = CsvRecordSource::new(&path).read().await.unwrap();
    let batch = BatchProcessor::new().process(&rows);
    assert_eq!(batch.entities.len(), 1);
    assert_eq!(batch.entities[0].player_name, "Alice");
}
