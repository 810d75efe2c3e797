use std::path::{Path, PathBuf};

use simfile_rs::{
    parse::{default_format_rank, select_simfile_by},
    prelude::*,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("files")
        .join(name)
}

#[test]
fn test_read_simfile_by_extension() {
    let config = ParseConfig::default();
    for (name, format) in [
        ("sample.sm", SimfileFormat::Sm),
        ("sample.ssc", SimfileFormat::Ssc),
        ("sample.dwi", SimfileFormat::Dwi),
    ] {
        let path = fixture(name);
        let output = read_simfile(&path, &config).expect("fixture must load");
        assert_eq!(output.song.format, format);
        assert_eq!(output.song.source.as_deref(), Some(path.as_path()));
        assert!(!output.song.charts.is_empty());
    }
}

#[test]
fn test_read_simfile_errors() {
    let config = ParseConfig::default();
    assert!(matches!(
        read_simfile(fixture("sample.ogg"), &config),
        Err(LoadError::UnknownFormat(_))
    ));
    assert!(matches!(
        read_simfile(fixture("missing.sm"), &config),
        Err(LoadError::Io(_))
    ));
    assert!(matches!(
        read_simfile(
            fixture("sample.sm"),
            &ParseConfig::new().max_input_len(Some(64))
        ),
        Err(LoadError::Parse(ParseError::InputTooLarge { max: 64, .. }))
    ));
}

#[test]
fn test_select_simfile() {
    let directory = ["song.dwi", "song.SSC", "banner.png", "song.sm"];
    assert_eq!(select_simfile(directory), Some("song.sm"));
    assert_eq!(select_simfile(["song.dwi", "song.ssc"]), Some("song.ssc"));
    assert_eq!(select_simfile(["song.mp3"]), None);

    let prefer_ssc = |format| match format {
        SimfileFormat::Ssc => Some(0),
        other => default_format_rank(other).map(|rank| rank + 1),
    };
    assert_eq!(select_simfile_by(directory, prefer_ssc), Some("song.SSC"));
}

#[cfg(feature = "diagnostics")]
#[test]
fn test_emit_warnings_of_fixture() {
    use simfile_rs::diagnostics::{collect_chart_reports, emit_chart_warnings};

    let path = fixture("sample.sm");
    let source = std::fs::read_to_string(&path).unwrap();
    let output = parse_simfile(&source, SimfileFormat::Sm, &ParseConfig::default()).unwrap();
    assert_eq!(
        collect_chart_reports("sample.sm", &source, &output.warnings).len(),
        output.warnings.len()
    );
    emit_chart_warnings("sample.sm", &source, &output.warnings);
    emit_chart_warnings("sample.sm", &source, std::iter::empty());
}
