//! Atom 1.0 feed generation.

use atom_syndication::{
    Entry, EntryBuilder, Feed, FeedBuilder, FixedDateTime, GeneratorBuilder, Link, LinkBuilder,
    Person, PersonBuilder, Text,
};

use crate::site::{Article, Site};
use crate::utils::date::DateTimeUtc;

const EPOCH: DateTimeUtc = DateTimeUtc::from_ymd(1970, 1, 1);

fn to_fixed(date: Option<DateTimeUtc>) -> FixedDateTime {
    date.unwrap_or(EPOCH)
        .to_rfc3339()
        .parse()
        .unwrap_or_default()
}

/// Render the feed for `feed` (article indices, newest first).
pub fn atom_xml(site: &Site, feed: &[usize]) -> String {
    let settings = &site.settings;
    let base = format!("{}{}", settings.base_url(), settings.root);

    let entries: Vec<Entry> = feed
        .iter()
        .map(|&i| article_entry(&site.articles[i], settings.base_url()))
        .collect();

    let updated = to_fixed(feed.first().and_then(|&i| site.articles[i].meta.posted_at));

    let author: Person = PersonBuilder::default()
        .name(settings.author_name.clone())
        .email(non_empty(&settings.author_email))
        .uri(non_empty(&settings.author_uri))
        .build();

    let self_link: Link = LinkBuilder::default()
        .href(format!("{base}{}", super::FEED_PATH))
        .rel("self".to_string())
        .mime_type(Some("application/atom+xml".to_string()))
        .build();

    let alternate_link: Link = LinkBuilder::default()
        .href(base.clone())
        .rel("alternate".to_string())
        .build();

    let feed: Feed = FeedBuilder::default()
        .title(Text::plain(settings.name.clone()))
        .id(base)
        .updated(updated)
        .authors(vec![author])
        .links(vec![self_link, alternate_link])
        .subtitle(non_empty(&settings.tagline).map(Text::plain))
        .generator(Some(
            GeneratorBuilder::default()
                .value("s4g")
                .version(Some(env!("CARGO_PKG_VERSION").to_string()))
                .build(),
        ))
        .entries(entries)
        .build();

    feed.to_string()
}

fn article_entry(article: &Article, base_url: &str) -> Entry {
    let url = format!("{base_url}{}", article.web_path);
    let date = to_fixed(article.meta.posted_at);

    let link: Link = LinkBuilder::default()
        .href(url.clone())
        .rel("alternate".to_string())
        .build();

    EntryBuilder::default()
        .title(Text::plain(article.meta.title.clone()))
        .id(url)
        .published(Some(date))
        .updated(date)
        .links(vec![link])
        .summary(non_empty(&article.meta.description).map(Text::plain))
        .build()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
