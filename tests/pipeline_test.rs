//! End-to-end tests: project file on disk to markdown, JSON and markup.

use std::path::{Path, PathBuf};

use slatext::{
    dump_attribute_values, ChunkKind, Error, ErrorKind, LayoutConfig, LexerOptions, ScribusProject,
};

const WALKING_TOUR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SCRIBUSUTF8NEW Version="1.5.8">
    <DOCUMENT TITLE="Walking Tour" PAGEWIDTH="612" PAGEHEIGHT="792" BORDERLEFT="40" BORDERRIGHT="40" BORDERTOP="36" BORDERBOTTOM="36">
        <PAGE PAGEXPOS="100" NUM="0"/>
        <!-- objects are stored in creation order, not reading order -->
        <PAGEOBJECT OwnPage="0" XPOS="316" YPOS="400" WIDTH="256" HEIGHT="300">
            <StoryText><DefaultStyle/><ITEXT CH="Bridge"/></StoryText>
        </PAGEOBJECT>
        <PAGEOBJECT OwnPage="0" XPOS="40" YPOS="36" WIDTH="532" HEIGHT="40">
            <StoryText><ITEXT CH="Old Town"/></StoryText>
        </PAGEOBJECT>
        <PAGEOBJECT OwnPage="0" XPOS="40" YPOS="100" WIDTH="256">
            <StoryText>
                <ITEXT CH="Start at the square."/>
                <para/>
                <ITEXT CH="Bring:"/>
                <para/>
                <ITEXT CH="• water"/>
                <para/>
                <ITEXT CH="• a hat"/>
            </StoryText>
        </PAGEOBJECT>
        <PAGEOBJECT OwnPage="0" XPOS="316" YPOS="100" WIDTH="256">
            <StoryText><ITEXT CH="Market"/><tab/><ITEXT CH="9am"/></StoryText>
        </PAGEOBJECT>
        <PAGEOBJECT OwnPage="0" XPOS="40" YPOS="350" WIDTH="532">
            <StoryText><ITEXT CH="Riverside"/></StoryText>
        </PAGEOBJECT>
        <PAGEOBJECT OwnPage="0" XPOS="40" YPOS="400" WIDTH="256">
            <StoryText><ITEXT CH="Cathedral"/></StoryText>
        </PAGEOBJECT>
        <PAGEOBJECT OwnPage="2" XPOS="40" YPOS="36" WIDTH="532" PFILE="images/river_walk-map.png"/>
        <FRAMEOBJECT OwnPage="-1" XPOS="0" YPOS="0" WIDTH="10">
            <StoryText><ITEXT CH="Deleted"/></StoryText>
        </FRAMEOBJECT>
    </DOCUMENT>
</SCRIBUSUTF8NEW>
"#;

const PAGE_ONE: &str = "\n\n# Walking Tour\n\
    \n\n## Page 1\n\
    \n\nOld Town\
    \n\nStart at the square.\n\nBring:\n* water\n* a hat\
    \n\nMarket\t9am\
    \n\nRiverside\
    \n\nCathedral\
    \n\nBridge";

fn write_project(dir: &Path) -> PathBuf {
    std::fs::create_dir(dir.join("images")).unwrap();
    std::fs::write(dir.join("images/river_walk-map.png"), b"png").unwrap();
    let path = dir.join("tour.sla");
    std::fs::write(&path, WALKING_TOUR).unwrap();
    path
}

fn dump(project: &mut ScribusProject) -> String {
    let mut out = Vec::new();
    project.dump_text(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_dump_reading_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut project = ScribusProject::open(write_project(dir.path())).unwrap();
    let text = dump(&mut project);

    let (page_one, rest) = text.split_at(PAGE_ONE.len());
    assert_eq!(page_one, PAGE_ONE);

    let image = rest.strip_prefix("\n\n## Page 3\n\n\n\n![river walk map: ").unwrap();
    let (time, tail) = image.split_once(']').unwrap();
    assert_eq!(time.len(), "2026-01-01 00:00:00".len());
    assert_eq!(tail, "(images/river_walk-map.png)\n");

    assert!(!text.contains("Deleted"));
    assert!(!text.contains("## Page 2"));

    let pages = project.document().pages().unwrap();
    assert_eq!(pages.keys().copied().collect::<Vec<_>>(), vec![-1, 0, 2]);
    assert_eq!(pages[&0].elements.len(), 6);
}

#[test]
fn test_unsorted_dump_keeps_everything() {
    let dir = tempfile::tempdir().unwrap();
    let project = ScribusProject::open(write_project(dir.path())).unwrap();
    let mut out = Vec::new();
    project.dump_text_unsorted(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("\n\nBridge\n\nOld Town"));
    assert!(text.ends_with("Deleted"));
}

#[test]
fn test_attribute_values_in_source_order() {
    let mut out = Vec::new();
    let count = dump_attribute_values(WALKING_TOUR, "CH", &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(count, 11);
    assert!(text.starts_with("Bridge\nOld Town\nStart at the square.\n"));
    assert!(text.ends_with("Deleted\n"));
}

#[test]
fn test_tree_json() {
    let dir = tempfile::tempdir().unwrap();
    let project = ScribusProject::open(write_project(dir.path())).unwrap();
    let text = project.document().to_json(false).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    let top = &json["children"];
    assert_eq!(top[0]["tagName"], "?xml");
    assert_eq!(top[0]["self_closer"], "?");
    let document = &top[1]["children"][0];
    assert_eq!(document["tagName"], "DOCUMENT");
    assert_eq!(document["attributes"]["TITLE"], "Walking Tour");
    assert_eq!(document["children"][1]["context"], "comment");

    // Attributes keep source order in the serialized text
    assert!(text.find("\"TITLE\"").unwrap() < text.find("\"BORDERBOTTOM\"").unwrap());
}

#[test]
fn test_edit_and_write_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut project = ScribusProject::open(write_project(dir.path())).unwrap();

    let doc = project.document_mut();
    let first = doc.find_first("ITEXT").unwrap();
    assert!(doc.set_attribute(first, "CH", Some("Footbridge".to_string())));
    let markup = doc.to_markup().unwrap();
    assert!(markup.contains("<ITEXT CH=\"Footbridge\"/>"));

    let edited = dir.path().join("edited.sla");
    std::fs::write(&edited, &markup).unwrap();
    let mut reopened = ScribusProject::open(&edited).unwrap();
    assert!(dump(&mut reopened).contains("\n\nCathedral\n\nFootbridge"));

    let doc = project.document_mut();
    doc.set_attribute(first, "CH", Some("say \"hi\"".to_string()));
    let err = doc.to_markup().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_missing_image_aborts_dump() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_project(dir.path());
    std::fs::remove_file(dir.path().join("images/river_walk-map.png")).unwrap();

    let mut project = ScribusProject::open(path).unwrap();
    let err = project.dump_text(&mut Vec::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_broken_markup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.sla");
    let broken = WALKING_TOUR.replace(
        "<ITEXT CH=\"Riverside\"/></StoryText>",
        "<ITEXT CH=\"Riverside\"/>",
    );
    std::fs::write(&path, broken).unwrap();

    match ScribusProject::open(&path) {
        Err(Error::MismatchedEndTag { tag, open, .. }) => {
            assert_eq!(tag, "PAGEOBJECT");
            assert_eq!(open[0], "StoryText");
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }

    let mut config = LayoutConfig::default();
    config.lexer = LexerOptions {
        strict: false,
        ..LexerOptions::scribus()
    };
    let project = ScribusProject::open_with(&path, config).unwrap();
    assert!(project.document().find_all("ITEXT").len() >= 9);
}

#[test]
fn test_lexer_chunks() {
    let chunks: Vec<_> = slatext::lex(WALKING_TOUR, LexerOptions::scribus()).unwrap();
    let starts = chunks.iter().filter(|c| c.kind == ChunkKind::Start).count();
    let ends = chunks.iter().filter(|c| c.kind == ChunkKind::End).count();
    let self_closing = chunks.iter().filter(|c| c.is_self_closing()).count();
    assert_eq!(starts - self_closing, ends);
    assert!(chunks.iter().all(|c| c.kind != ChunkKind::Content));
}

#[test]
fn test_nan_coordinate_is_an_error() {
    let mut objects = String::new();
    for i in 0..40 {
        let y = if i % 7 == 0 { "nan".to_string() } else { (i * 10).to_string() };
        objects.push_str(&format!(
            "<PAGEOBJECT OwnPage=\"0\" XPOS=\"{}\" YPOS=\"{}\" WIDTH=\"100\"><ITEXT CH=\"t{}\"/></PAGEOBJECT>\n",
            (i % 2) * 300,
            y,
            i
        ));
    }
    let sla = format!(
        "<SCRIBUSUTF8NEW><DOCUMENT TITLE=\"N\" PAGEWIDTH=\"612\" BORDERLEFT=\"40\" BORDERRIGHT=\"40\">\n{}</DOCUMENT></SCRIBUSUTF8NEW>",
        objects
    );

    let mut doc = slatext::Document::parse(sla, LexerOptions::scribus()).unwrap();
    let err = doc.dump_text(&mut Vec::new(), &LayoutConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingData);
    match err {
        Error::InvalidNumber { attribute, value, .. } => {
            assert_eq!(attribute, "YPOS");
            assert_eq!(value, "nan");
        }
        other => panic!("unexpected error: {}", other),
    }
}
