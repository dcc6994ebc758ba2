// src/fetch/whats_new.rs

use tracing::{error, info};
use url::Url;

use super::{fetch_index, progress_bar, row, Row};
use crate::{
    config::Settings,
    error::Result,
    html::{find_in_document, find_all, find_tag, required_attr, text_of, TagQuery},
    http::CachedClient,
};

pub const HEADER: [&str; 3] = ["Article link", "Title", "Editor, author"];

/// One row per "What's New" article: link, page title, editor/author line.
pub fn whats_new(client: &CachedClient, settings: &Settings) -> Result<Option<Vec<Row>>> {
    let index_url = Url::parse(&settings.main_doc_url)?.join("whatsnew/")?;
    let Some(doc) = fetch_index(client, index_url.as_str())? else {
        error!(url = %index_url, "could not load the What's New index");
        return Ok(None);
    };

    let main_section = find_in_document(
        &doc,
        &TagQuery::new("section").attr("id", "what-s-new-in-python"),
    )?;
    let toc = find_tag(main_section, &TagQuery::new("div").attr("class", "toctree-wrapper"))?;
    let sections = find_all(toc, &TagQuery::new("li").attr("class", "toctree-l1"));

    let mut results = vec![row(HEADER)];
    let pb = progress_bar(sections.len());
    for section in sections {
        let anchor = find_tag(section, &TagQuery::new("a"))?;
        let link = index_url.join(required_attr(anchor, "href")?)?;

        let page = client.get_html(link.as_str())?;
        let h1 = find_in_document(&page, &TagQuery::new("h1"))?;
        let dl = find_in_document(&page, &TagQuery::new("dl"))?;
        results.push(vec![
            link.to_string(),
            text_of(h1),
            text_of(dl).replace('\n', " "),
        ]);
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(articles = results.len() - 1, "collected What's New articles");
    Ok(Some(results))
}
