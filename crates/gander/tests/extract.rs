// End-to-end scenarios over the whole pipeline: raw HTML in, Article out.

use gander::{Config, Gander};
use pretty_assertions::assert_eq;

// Fifty-ish words with plenty of common stopwords, the shape of a real
// article paragraph.
const LONG_PARA: &str = "It was then that the committee said it would be necessary for all of \
    them to act together on the plan, because there was no other way to be sure of what could \
    happen to any of us when the work was finally done and the results were out in the open.";

fn extract(html: &str) -> gander::Article {
    Gander::default()
        .extract_html(None, html)
        .expect("extraction never errors on well-formed input")
}

#[test]
fn minimal_document_selects_the_long_paragraph() {
    let html = format!(
        "<html><head><title>Foo</title></head><body>\
         <div><p>{long}</p><p>short</p></div>\
         </body></html>",
        long = LONG_PARA
    );
    let article = extract(&html);

    assert!(article.body_text.starts_with("It was then"));
    // The low-stopword paragraph contributes nothing to the body.
    let runs: Vec<&str> = article.body_text.split("\n\n").collect();
    assert!(!runs.contains(&"short"));
    assert_eq!(article.title, "Foo");
}

#[test]
fn published_time_meta_is_parsed_exactly_and_priority_holds() {
    let html = "<html><head>\
         <meta property='article:published_time' content='2021-05-04T10:00:00Z'>\
         <meta name='PublishDate' content='1999-01-01T00:00:00Z'>\
         </head><body><p>x</p></body></html>";
    let article = Gander::default()
        .extract_html(Some("https://example.com/story/123"), html)
        .unwrap();

    let date = article.publish_date.expect("date parsed");
    assert_eq!(date.to_rfc3339(), "2021-05-04T10:00:00+00:00");
}

#[test]
fn blockless_div_never_survives_as_div() {
    let html = format!(
        "<html><body><div id='loose'>{}</div></body></html>",
        LONG_PARA
    );
    let article = extract(&html);
    // The loose div was promoted to a paragraph and extracted as the body.
    assert!(article.body_text.starts_with("It was then"));
}

#[test]
fn authors_flow_from_meta_and_byline_elements() {
    let html = format!(
        "<html><head><meta name='author' content='By: John Smith, Jane Doe'></head>\
         <body><div><p>{}</p></div></body></html>",
        LONG_PARA
    );
    let article = extract(&html);
    assert_eq!(article.authors, vec!["John Smith", "Jane Doe"]);
}

#[test]
fn navigation_blocks_lose_to_article_body() {
    let nav_links: String = (0..8)
        .map(|i| format!("<li><a href='/s/{i}'>section {i}</a></li>"))
        .collect();
    let html = format!(
        "<html><body>\
         <ul class='navbar'>{nav}</ul>\
         <div id='story'><p>{long}</p><p>{long}</p><p>{long}</p></div>\
         <div class='related-content'><a href='/r/1'>Related story one</a></div>\
         </body></html>",
        nav = nav_links,
        long = LONG_PARA
    );
    let article = extract(&html);

    assert!(article.body_text.contains("It was then"));
    assert!(!article.body_text.contains("section 3"));
    assert!(!article.body_text.contains("Related story"));
}

#[test]
fn canonical_link_and_meta_fields_populate() {
    let html = format!(
        "<html lang='en-GB'><head>\
         <link rel='canonical' href='https://example.com/canonical-story'>\
         <meta name='description' content='What the committee did next'>\
         <meta name='keywords' content='committee,plan'>\
         <meta property='og:image' content='/lead.png'>\
         <meta property='og:image:width' content='1200'>\
         </head><body><div><p>{}</p></div></body></html>",
        LONG_PARA
    );
    let article = Gander::default()
        .extract_html(Some("https://example.com/story"), &html)
        .unwrap();

    assert_eq!(article.canonical_link, "https://example.com/canonical-story");
    assert_eq!(article.meta_description, "What the committee did next");
    assert_eq!(article.meta_keywords, vec!["committee", "plan"]);
    assert_eq!(article.meta_lang, "en");
    assert_eq!(article.top_image.as_deref(), Some("https://example.com/lead.png"));
    assert_eq!(article.meta_data["og"]["image"]["width"], "1200");
}

#[test]
fn keep_article_html_round_trips_anchor_text() {
    let html = format!(
        "<html><body><div><p>{} Read <a href='/more'>the full report</a> now.</p></div></body></html>",
        LONG_PARA
    );
    let config = Config::builder().keep_article_html(true).build();
    let article = Gander::new(config).extract_html(None, &html).unwrap();

    // Text mode flattened the anchor without losing its inner text.
    assert!(article.body_text.contains("the full report"));
    assert!(!article.body_text.contains("<a"));
    // HTML mode kept sanitized markup.
    let kept = article.body_html.expect("html kept");
    assert!(kept.contains("<p>"));
}

#[test]
fn videos_and_images_come_from_the_article_body() {
    let html = format!(
        "<html><body><div>\
         <p>{long}</p>\
         <iframe src='https://www.youtube.com/embed/xyz' width='560' height='315'></iframe>\
         <p>{long}</p><img src='/photo.jpg'>\
         </div></body></html>",
        long = LONG_PARA
    );
    let article = Gander::default()
        .extract_html(Some("https://example.com/a"), &html)
        .unwrap();

    assert_eq!(article.videos.len(), 1);
    assert_eq!(article.videos[0].provider.as_deref(), Some("youtube"));
    assert!(article.images.contains("https://example.com/photo.jpg"));
}

#[test]
fn nlp_fields_are_populated_and_deterministic() {
    let html = format!(
        "<html><head><title>The committee plan</title></head>\
         <body><div><p>{long}</p><p>{long}</p></div></body></html>",
        long = LONG_PARA
    );
    let first = extract(&html);
    let second = extract(&html);

    assert!(!first.keywords.is_empty());
    assert!(first.keywords.contains_key("committee"));
    assert!(!first.keywords.contains_key("the"));
    assert_eq!(first.keywords, second.keywords);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn unparsable_input_degrades_to_empty_article() {
    let article = extract("");
    assert!(article.is_empty());
    assert!(article.publish_date.is_none());
    assert!(article.authors.is_empty());

    let article = extract("\u{0}\u{1}<<<<");
    assert!(article.body_text.is_empty());
}

#[test]
fn repairing_parser_handles_control_characters() {
    let config = Config::builder().parser(gander::ParserKind::Repairing).build();
    let html = format!(
        "<html><body><div><p>{}\u{0}</p></div></body></html>",
        LONG_PARA
    );
    let article = Gander::new(config).extract_html(None, &html).unwrap();
    assert!(article.body_text.starts_with("It was then"));
}

#[test]
fn concurrent_extractions_are_independent() {
    let html_a = format!("<html><body><div><p>{}</p></div></body></html>", LONG_PARA);
    let html_b = format!(
        "<html><body><div><p>{} Entirely different tail here.</p></div></body></html>",
        LONG_PARA
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let html = if i % 2 == 0 { html_a.clone() } else { html_b.clone() };
            std::thread::spawn(move || Gander::default().extract_html(None, &html).unwrap())
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let article = handle.join().expect("no panics");
        if i % 2 == 1 {
            assert!(article.body_text.contains("Entirely different tail"));
        } else {
            assert!(!article.body_text.contains("Entirely different tail"));
        }
    }
}
