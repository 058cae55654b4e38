//! End-to-end tag usage and coverage over files on disk.

mod common;

use common::{iso2709_record, marcxml_collection, write_file, write_gz};
use marc_stats::config::{CoverageConfig, TagUseConfig};
use marc_stats::formats::InputFormat;
use marc_stats::stats::{accumulate_paths, Accumulator, CoverageStats, TagOrder, UsageStats};
use marc_stats::{MarcError, TagId, TagPolicy};

fn tag(value: u32) -> TagId {
    TagId::new(value)
}

#[test]
fn test_usage_over_mixed_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(
        &root.join("a/part1.xml"),
        marcxml_collection(&[&["001", "245", "650", "650"], &["001", "100", "245"]]).as_bytes(),
    );
    write_gz(
        &root.join("b/part2.xml.gz"),
        marcxml_collection(&[&["001", "245"]]).as_bytes(),
    );
    let mut mrc = iso2709_record(&["001", "008", "245"]);
    mrc.extend(iso2709_record(&["001", "700"]));
    write_file(&root.join("c/part3.mrc"), &mrc);

    let mut stats = UsageStats::new();
    let files = accumulate_paths(&mut stats, &[root.to_path_buf()], None).unwrap();

    assert_eq!(files, 3);
    assert_eq!(stats.num_records(), 5);
    assert_eq!(stats.num_bad(), 0);
    assert_eq!(stats.count(tag(1)), 5);
    assert_eq!(stats.count(tag(245)), 4);
    assert_eq!(stats.count(tag(650)), 1);
    assert_eq!(stats.count(tag(8)), 1);
    assert_eq!(stats.count(tag(700)), 1);
}

#[test]
fn test_bad_records_are_counted_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.xml");
    let xml = r#"<collection xmlns="http://www.loc.gov/MARC21/slim">
        <record><controlfield tag="001">1</controlfield><datafield tag="245"/></record>
        <record><controlfield tag="001">2</controlfield><datafield tag="24A"/></record>
        <record><datafield ind1=" "/></record>
        <record><controlfield tag="001">4</controlfield></record>
    </collection>"#;
    write_file(&path, xml.as_bytes());

    let report = TagUseConfig {
        inputs: vec![path],
        ..TagUseConfig::default()
    }
    .run()
    .unwrap();

    assert_eq!(report.num_records, 2);
    assert_eq!(report.num_bad, 2);
    let text = report.to_string();
    assert!(text.starts_with("# Read 2 records (ignored 2 bad)"), "{text}");
    assert!(text.contains("\n001         2  100.0%\n"), "{text}");
    assert!(text.contains("\n245         1  50.0%\n"), "{text}");
}

#[test]
fn test_broken_xml_is_fatal_and_names_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("1-good.xml");
    let bad = dir.path().join("2-bad.xml");
    write_file(&good, marcxml_collection(&[&["245"]]).as_bytes());
    write_file(&bad, b"<collection><record><datafield tag=\"245\"></record></collection>");

    let mut stats = UsageStats::new();
    let err = accumulate_paths(&mut stats, &[dir.path().to_path_buf()], None).unwrap_err();

    assert!(matches!(err, MarcError::Source { .. }));
    assert!(err.to_string().contains("2-bad.xml"), "{err}");
    assert_eq!(stats.num_records(), 1);
}

#[test]
fn test_cut_off_xml_is_fatal() {
    let documents: [&[u8]; 2] = [
        b"<collection><record><datafield tag=\"245\"/></record><record><controlfield tag=\"001\">x",
        b"<collection><record><datafield tag=\"245\"/></record>",
    ];
    for document in documents {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("cut.xml"), document);

        let mut stats = UsageStats::new();
        let err = accumulate_paths(&mut stats, &[dir.path().to_path_buf()], None).unwrap_err();

        assert!(matches!(err, MarcError::Source { .. }), "{err}");
        assert!(err.to_string().contains("cut.xml"), "{err}");
        assert_eq!(stats.num_bad(), 0);
    }
}

#[test]
fn test_missing_input_is_fatal() {
    let mut stats = UsageStats::new();
    let err = accumulate_paths(&mut stats, &["/no/such/dir".into()], None).unwrap_err();
    assert!(err.to_string().contains("/no/such/dir"));
}

#[test]
fn test_format_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.dat");
    write_file(&path, &iso2709_record(&["001", "245"]));

    let mut stats = UsageStats::new();
    accumulate_paths(&mut stats, &[path], Some(InputFormat::Iso2709)).unwrap();
    assert_eq!(stats.count(tag(245)), 1);
}

#[test]
fn test_collapse_runs_over_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.xml");
    write_file(
        &path,
        marcxml_collection(&[&["100", "245", "100", "100"]]).as_bytes(),
    );

    let report = TagUseConfig {
        inputs: vec![path],
        format: None,
        policy: TagPolicy::CollapseRuns,
    }
    .run()
    .unwrap();
    let row = report.rows.iter().find(|r| r.tag == tag(100)).unwrap();
    assert_eq!(row.count, 2);
}

#[test]
fn test_coverage_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let order = dir.path().join("marc_tag_order.dat");
    write_file(
        &order,
        b"# ranked by importance\n001 control number\n245 title\n100 author\n650 subject\n",
    );
    let data = dir.path().join("data/records.xml.gz");
    write_gz(
        &data,
        marcxml_collection(&[
            &["001"],
            &["001", "245"],
            &["245", "001", "245"],
            &["001", "100"],
            &["001", "999"],
            &[],
        ])
        .as_bytes(),
    );

    let report = CoverageConfig {
        inputs: vec![dir.path().join("data")],
        format: None,
        order_list: order,
    }
    .run()
    .unwrap();

    assert_eq!(report.num_records, 6);
    assert_eq!(report.num_uncovered, 1);
    let added: Vec<u64> = report.rows.iter().map(|r| r.added).collect();
    let totals: Vec<u64> = report.rows.iter().map(|r| r.total).collect();
    assert_eq!(added, [2, 2, 1, 0]);
    assert_eq!(totals, [2, 4, 5, 5]);

    let text = report.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "# Read 6 records (ignored 0 bad), with the following coverage results:"
    );
    assert_eq!(
        lines[4],
        "4 tags (001,245,100,650)               5 (+     0)  83.3%"
    );
    assert_eq!(lines[5], "# 1 records use tags outside the order");
}

#[test]
fn test_coverage_accumulator_directly() {
    let order = TagOrder::new(vec![tag(1), tag(8), tag(245)]).unwrap();
    let mut stats = CoverageStats::new(order);
    for tags in [&["001"][..], &["008", "001"], &["245"], &["650"]] {
        stats.add(&common::record_with(tags));
    }
    assert_eq!(stats.bucket(tag(1)), Some(1));
    assert_eq!(stats.bucket(tag(8)), Some(1));
    assert_eq!(stats.bucket(tag(245)), Some(1));
    assert_eq!(stats.num_uncovered(), 1);
    assert_eq!(stats.num_covered() + stats.num_uncovered(), stats.num_records());
}
