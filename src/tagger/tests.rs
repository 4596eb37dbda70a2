use super::*;
use crate::config::TaggerConfig;

const HERO: &str = r#"export const Hero = ({ subtitle }) => (
  <section>
    <h1 className="title">Hello</h1>
    <p>{subtitle}</p>
  </section>
);
"#;

fn tagger() -> Tagger {
    Tagger::new(TaggerConfig::default(), "/project")
}

fn tag(source: &str, path: &str) -> Option<String> {
    tagger()
        .transform(source, Path::new(path))
        .map(TransformOutput::into_code)
}

#[test]
fn tags_editable_elements_with_literal_text() {
    let output = tag(HERO, "/project/src/Hero.tsx").expect("should tag");
    assert_eq!(
        output,
        r#"export const Hero = ({ subtitle }) => (
  <section>
    <h1 className="title" data-edit-id="src/Hero.tsx:3:4">Hello</h1>
    <p>{subtitle}</p>
  </section>
);
"#
    );
}

#[test]
fn tagging_twice_is_the_same_as_tagging_once() {
    let once = tag(HERO, "/project/src/Hero.tsx").unwrap();
    assert_eq!(tag(&once, "/project/src/Hero.tsx"), None);
    assert_eq!(once.matches("data-edit-id").count(), 1);
}

#[test]
fn line_structure_is_preserved() {
    let output = tag(HERO, "/project/src/Hero.tsx").unwrap();
    assert_eq!(output.lines().count(), HERO.lines().count());
    for (before, after) in HERO.lines().zip(output.lines()) {
        if !after.contains("data-edit-id") {
            assert_eq!(before, after);
        }
    }
}

#[test]
fn member_tags_match_on_their_final_segment() {
    let source = "const Title = () => <motion.h1 initial={{ opacity: 0 }}>Welcome</motion.h1>;\n";
    let output = tag(source, "/project/src/Title.jsx").unwrap();
    assert_eq!(
        output,
        "const Title = () => <motion.h1 initial={{ opacity: 0 }} data-edit-id=\"src/Title.jsx:1:20\">Welcome</motion.h1>;\n"
    );
}

#[test]
fn nested_elements_are_judged_independently() {
    let source = "const A = () => (\n  <div>\n    <p>Outer <span>{count}</span> <b>bold</b></p>\n  </div>\n);\n";
    let output = tag(source, "/project/A.tsx").unwrap();
    assert_eq!(
        output,
        "const A = () => (\n  <div>\n    <p data-edit-id=\"A.tsx:3:4\">Outer <span>{count}</span> <b>bold</b></p>\n  </div>\n);\n"
    );
}

#[test]
fn elements_without_literal_text_are_skipped() {
    assert_eq!(tag("const A = () => <p>   </p>;\n", "/project/A.tsx"), None);
    assert_eq!(tag("const A = () => <p>{text}</p>;\n", "/project/A.tsx"), None);
    assert_eq!(
        tag("const A = () => <p><span>hi</span></p>;\n", "/project/A.tsx").unwrap(),
        "const A = () => <p><span data-edit-id=\"A.tsx:1:19\">hi</span></p>;\n"
    );
    assert_eq!(tag("const A = () => <div>plain</div>;\n", "/project/A.tsx"), None);
    assert_eq!(tag("const A = () => <>Fragment</>;\n", "/project/A.tsx"), None);
}

#[test]
fn custom_allow_list() {
    let tagger = Tagger::new(
        TaggerConfig::default().with_editable_tags(vec!["div".into()]),
        "/project",
    );
    let output = tagger
        .transform("const A = () => <div>plain</div>;\n", Path::new("A.tsx"))
        .unwrap();
    assert_eq!(
        output.code(),
        "const A = () => <div data-edit-id=\"A.tsx:1:16\">plain</div>;\n"
    );
    assert_eq!(output.edit_ids(), &[EditId::new("A.tsx", 1, 16)]);
}

#[test]
fn columns_count_chars_not_bytes() {
    let source = "const título = <p>Hola</p>;\n";
    let output = tagger()
        .transform(source, Path::new("/project/src/Hola.jsx"))
        .unwrap();
    assert_eq!(output.edit_ids(), &[EditId::new("src/Hola.jsx", 1, 15)]);
}

#[test]
fn multi_line_opening_tags_keep_their_lines() {
    let source = "const A = () => (\n  <Button\n    variant=\"ghost\"\n  >\n    Go\n  </Button>\n);\n";
    let output = tag(source, "/project/A.tsx").unwrap();
    assert_eq!(
        output,
        "const A = () => (\n  <Button\n    variant=\"ghost\"\n   data-edit-id=\"A.tsx:2:2\">\n    Go\n  </Button>\n);\n"
    );
}

#[test]
fn non_template_files_pass_through() {
    let tagger = tagger();
    assert!(tagger
        .transform("export const x = 1;\n", Path::new("/project/src/lib/utils.ts"))
        .is_none());
    assert!(matches!(
        tagger.try_transform("", Path::new("/project/src/lib/utils.ts")),
        Err(TagError::Unsupported(_))
    ));
}

#[test]
fn dependencies_pass_through() {
    assert!(matches!(
        tagger().try_transform(HERO, Path::new("/project/node_modules/ui/Hero.tsx")),
        Err(TagError::Dependency(_))
    ));
}

#[test]
fn parse_failures_pass_through() {
    let source = "const broken = <p>Hello;\n";
    assert_eq!(tag(source, "/project/Broken.tsx"), None);
    assert!(matches!(
        tagger().try_transform(source, Path::new("/project/Broken.tsx")),
        Err(TagError::Parse { .. })
    ));
}

#[test]
fn files_outside_the_root_pass_through() {
    let tagger = tagger();
    assert!(matches!(
        tagger.try_transform(HERO, Path::new("/elsewhere/Hero.tsx")),
        Err(TagError::OutsideRoot(_))
    ));
    assert!(matches!(
        tagger.try_transform(HERO, Path::new("../Hero.tsx")),
        Err(TagError::OutsideRoot(_))
    ));
    assert_eq!(
        tagger.relative_path(Path::new("./src/Hero.tsx")).unwrap(),
        "src/Hero.tsx"
    );
}

#[test]
fn quotes_in_paths_become_expression_containers() {
    let id = EditId::new("src/we\"ird.tsx", 1, 0);
    assert_eq!(
        render_attribute(&id),
        r#"data-edit-id={"src/we\"ird.tsx:1:0"}"#
    );
}

#[test]
fn source_map_points_back_past_the_insertion() {
    let output = tagger()
        .transform(HERO, Path::new("/project/src/Hero.tsx"))
        .unwrap();
    let map = sourcemap::SourceMap::from_slice(output.source_map().as_bytes()).unwrap();
    assert_eq!(map.get_source(0), Some("src/Hero.tsx"));

    // `>` of the h1 opening tag moved from column 25 to 57
    let token = map.lookup_token(2, 57).unwrap();
    assert_eq!(token.get_src_line(), 2);
    assert_eq!(token.get_src_col(), 25);

    let token = map.lookup_token(3, 4).unwrap();
    assert_eq!(token.get_src_line(), 3);
    assert_eq!(token.get_src_col(), 0);
}

#[test]
fn source_map_columns_count_utf16_units() {
    let source = "const A = () => <div>😀 <p>hi</p></div>;\n";
    let output = tagger()
        .transform(source, Path::new("/project/src/A.tsx"))
        .unwrap();
    assert_eq!(output.edit_ids(), &[EditId::new("src/A.tsx", 1, 23)]);

    // the emoji is one char but two UTF-16 units, so `>` sits at 26, then 56
    let map = sourcemap::SourceMap::from_slice(output.source_map().as_bytes()).unwrap();
    let token = map.lookup_token(0, 56).unwrap();
    assert_eq!(token.get_src_line(), 0);
    assert_eq!(token.get_src_col(), 26);
}
