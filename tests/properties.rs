use proptest::prelude::*;
use pulldown_cmark::{Parser, html};
use site_markdown::{Engine, EngineOptions, HandlebarsTag};

fn plain_render(src: &str) -> String {
    let parser = Parser::new_ext(src, EngineOptions::default().to_pulldown_options());
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn engine() -> Engine {
    Engine::builder().extension(HandlebarsTag).build()
}

proptest! {
    #[test]
    fn without_braces_output_matches_pulldown(src in "[a-zA-Z0-9 *_`#>\\-\\[\\]()!\n]{0,80}") {
        prop_assert_eq!(engine().render(&src).unwrap(), plain_render(&src));
    }

    #[test]
    fn placeholder_survives_inline_markup(inner in "[a-z_* ]{0,12}") {
        let src = format!("Hello {{{{{inner}}}}} world");
        let html = engine().render(&src).unwrap();
        let placeholder = format!("{{{{{inner}}}}}");
        prop_assert!(html.contains(&placeholder), "{:?} lost in {:?}", placeholder, html);
    }

    // A placeholder with a plain name is already inert to pulldown-cmark, so
    // the guard must not change anything around it.
    #[test]
    fn placeholder_keeps_surrounding_delimiters(
        before in "[a*_\\[\\]():! \n]{0,8}",
        name in "[a-z]{1,6}",
        triple in any::<bool>(),
        after in "[a*_\\[\\]():! \n]{0,8}",
    ) {
        let tag = if triple {
            format!("{{{{{{{name}}}}}}}")
        } else {
            format!("{{{{{name}}}}}")
        };
        let src = format!("{before}{tag}{after}");
        prop_assert_eq!(engine().render(&src).unwrap(), plain_render(&src));
    }
}
