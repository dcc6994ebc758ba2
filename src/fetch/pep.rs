// src/fetch/pep.rs

use scraper::{ElementRef, Html};
use tracing::{error, info};
use url::Url;

use super::{fetch_index, progress_bar, row, Row};
use crate::{
    config::{Settings, EXPECTED_STATUS},
    error::{ParserError, Result},
    html::{find_all, find_in_document, find_tag, required_attr, text_of, TagQuery},
    http::CachedClient,
};

pub const HEADER: [&str; 2] = ["Status", "Count"];

/// Status → count, kept in order of first appearance.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatusTally {
    entries: Vec<(String, usize)>,
}

impl StatusTally {
    pub fn add(&mut self, status: &str) {
        match self.entries.iter_mut().find(|(s, _)| s == status) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((status.to_string(), 1)),
        }
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    /// Header, one row per status, then `Total`.
    pub fn into_rows(self) -> Vec<Row> {
        let total = self.total();
        let mut rows = vec![row(HEADER)];
        rows.extend(
            self.entries
                .into_iter()
                .map(|(status, count)| vec![status, count.to_string()]),
        );
        rows.push(vec!["Total".to_string(), total.to_string()]);
        rows
    }
}

/// The text of the `dd` right after the `dt` labelled `Status` in the first
/// `dl` of a PEP page's content section.
pub fn pep_status(page: &Html) -> Result<String> {
    let content = find_in_document(page, &TagQuery::new("section").attr("id", "pep-content"))?;
    let dl = find_tag(content, &TagQuery::new("dl"))?;

    find_all(dl, &TagQuery::new("dt"))
        .into_iter()
        .filter(|dt| is_status_term(*dt))
        .find_map(|dt| next_element_sibling(dt).filter(|el| el.value().name() == "dd"))
        .map(|dd| text_of(dd).trim().to_string())
        .ok_or_else(|| ParserError::TagNotFound {
            tag: "dd".to_string(),
            attrs: r#"{after dt "Status"}"#.to_string(),
        })
}

fn is_status_term(dt: ElementRef<'_>) -> bool {
    let label = text_of(dt);
    let label = label.trim();
    label.strip_suffix(':').unwrap_or(label).trim_end() == "Status"
}

fn next_element_sibling(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Preview code shown in the index: the first cell minus its leading
/// type letter, e.g. `SF` → `F`, `I` → ``.
pub fn preview_status(cell_text: &str) -> String {
    cell_text.trim().chars().skip(1).collect()
}

/// Count PEPs by the status on each PEP's own page.
pub fn pep(client: &CachedClient, settings: &Settings) -> Result<Option<Vec<Row>>> {
    let index_url = Url::parse(&settings.pep_url)?;
    let Some(doc) = fetch_index(client, index_url.as_str())? else {
        error!(url = %index_url, "could not load the PEP index");
        return Ok(None);
    };

    let section = find_in_document(
        &doc,
        &TagQuery::new("section").attr("id", "index-by-category"),
    )?;
    let bodies = find_all(section, &TagQuery::new("tbody"));

    let mut tally = StatusTally::default();
    let pb = progress_bar(bodies.len());
    for body in bodies {
        for tr in find_all(body, &TagQuery::new("tr")) {
            let cells = find_all(tr, &TagQuery::new("td"));
            let [first, second, ..] = cells.as_slice() else {
                return Err(ParserError::TagNotFound {
                    tag: "td".to_string(),
                    attrs: "{at least 2 per row}".to_string(),
                });
            };
            let preview = preview_status(&text_of(*first));
            let anchor = find_tag(*second, &TagQuery::new("a"))?;
            let pep_url = index_url.join(required_attr(anchor, "href")?)?;

            let status = pep_status(&client.get_html(pep_url.as_str())?)?;
            check_expected(&pep_url, &preview, &status);
            tally.add(&status);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(peps = tally.total(), statuses = tally.entries().len(), "counted PEP statuses");
    Ok(Some(tally.into_rows()))
}

/// Log when a PEP page disagrees with its index preview. Never fails:
/// the page's own status is the one that gets counted.
fn check_expected(pep_url: &Url, preview: &str, status: &str) -> bool {
    let expected = EXPECTED_STATUS.get(preview).copied().unwrap_or(&[]);
    let matches = expected.contains(&status);
    if !matches {
        info!(
            url = %pep_url,
            actual = status,
            expected = ?expected,
            "mismatched statuses"
        );
    }
    matches
}
