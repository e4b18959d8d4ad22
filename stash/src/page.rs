use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use crate::record::RawItem;

lazy_static! {
    static ref SEL_ITEM: Selector =
        Selector::parse(".ipc-metadata-list-summary-item__c").expect("valid selector");
    static ref SEL_TITLE: Selector = Selector::parse(".ipc-title__text").expect("valid selector");
    static ref SEL_METADATA: Selector =
        Selector::parse(".dli-title-metadata-item").expect("valid selector");
    static ref SEL_RATING: Selector =
        Selector::parse("span.ipc-rating-star--base").expect("valid selector");
    static ref SEL_VOTES: Selector =
        Selector::parse(".ipc-rating-star--voteCount").expect("valid selector");
}

/// Split one fetched search-results document into per-item fragment bundles.
/// Each missing sub-element leaves its fragment absent; a page with no
/// recognizable item containers yields an empty batch.
pub fn parse_search_page(html: &str) -> Vec<RawItem> {
    let doc = Html::parse_document(html);
    let items: Vec<RawItem> = doc.select(&SEL_ITEM).map(parse_item).collect();
    tracing::debug!(items = items.len(), "parsed search page");
    items
}

fn parse_item(container: ElementRef) -> RawItem {
    RawItem {
        title: container.select(&SEL_TITLE).next().and_then(text_of),
        metadata: container.select(&SEL_METADATA).filter_map(text_of).collect(),
        // The rating lives in the star span's accessibility label, not its
        // visible text.
        rating: container
            .select(&SEL_RATING)
            .next()
            .and_then(|el| el.value().attr("aria-label"))
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty()),
        vote_count: container.select(&SEL_VOTES).next().and_then(text_of),
    }
}

fn text_of(el: ElementRef) -> Option<String> {
    let text = el.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body><ul>
          <li class="ipc-metadata-list-summary-item__c">
            <h3 class="ipc-title__text">1. Dune: Part Two</h3>
            <span class="dli-title-metadata-item">2024</span>
            <span class="dli-title-metadata-item">2h 46m</span>
            <span class="dli-title-metadata-item">PG-13</span>
            <span class="ipc-rating-star ipc-rating-star--base" aria-label="Rating: 8.5"></span>
            <span class="ipc-rating-star--voteCount">(520K)</span>
          </li>
          <li class="ipc-metadata-list-summary-item__c">
            <h3 class="ipc-title__text">2. Civil War</h3>
            <span class="dli-title-metadata-item">2024</span>
            <span class="dli-title-metadata-item">1h 49m</span>
          </li>
        </ul></body></html>"#;

    #[test]
    fn full_item_yields_all_fragments() {
        let items = parse_search_page(PAGE);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("1. Dune: Part Two"));
        assert_eq!(items[0].metadata, vec!["2024", "2h 46m", "PG-13"]);
        assert_eq!(items[0].rating.as_deref(), Some("Rating: 8.5"));
        assert_eq!(items[0].vote_count.as_deref(), Some("(520K)"));
    }

    #[test]
    fn missing_sub_elements_leave_fragments_absent() {
        let items = parse_search_page(PAGE);
        assert_eq!(items[1].title.as_deref(), Some("2. Civil War"));
        assert_eq!(items[1].metadata, vec!["2024", "1h 49m"]);
        assert_eq!(items[1].rating, None);
        assert_eq!(items[1].vote_count, None);
    }

    #[test]
    fn unrecognizable_page_yields_empty_batch() {
        assert!(parse_search_page("<html><body><p>404</p></body></html>").is_empty());
        assert!(parse_search_page("").is_empty());
    }
}
