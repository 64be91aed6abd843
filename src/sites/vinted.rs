use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::app::Result;
use crate::domain::{Item, Pagination};
use crate::sites::{parse_array, parse_overlay_title, strip_query, SiteAdapter};

/// vinted.com: numbered catalog pages.
pub struct Vinted;

// Ordinary and closet items use different data-testid prefixes but share
// the `<id>--<suffix>` ending, hence the `$=` matches.
const LISTING_SCRIPT: &str = r#"
(() => {
    const out = [];
    document.querySelectorAll('div[class^=feed-grid__item-content]').forEach(feed => {
        const closet = feed.closest('[class*=feed-grid__item--full-row]') !== null;
        feed.querySelectorAll('div[class=new-item-box__container]').forEach(box => {
            const testid = box.getAttribute('data-testid') || '';
            const id = testid.split('-').pop();
            const text = suffix => {
                const p = box.querySelector(`p[data-testid$='${id}--${suffix}']`);
                return p ? p.innerText : null;
            };
            const imgs = [];
            box.querySelectorAll('div[class^=new-item-box__image]').forEach(d => {
                const img = d.querySelector('img[class=web_ui__Image__content]');
                if (img && img.src) imgs.push(img.src);
            });
            const a = box.querySelector('a[class^=new-item-box__overlay]');
            out.push({
                testid: testid,
                closet: closet,
                href: a ? a.href : null,
                overlay: a ? a.getAttribute('title') : null,
                title: text('description-title'),
                subtitle: text('description-subtitle'),
                price: text('price-text'),
                img_urls: imgs,
            });
        });
    });
    return out;
})()
"#;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawItem {
    testid: Option<String>,
    closet: bool,
    href: Option<String>,
    overlay: Option<String>,
    title: Option<String>,
    subtitle: Option<String>,
    price: Option<String>,
    img_urls: Vec<String>,
}

/// `data-testid` values look like `product-item-id-4211806930`; the id is the
/// last dash-separated part.
fn item_id(testid: &str) -> &str {
    testid.rsplit('-').next().unwrap_or("")
}

impl RawItem {
    fn into_item(self) -> Item {
        let id = item_id(self.testid.as_deref().unwrap_or_default()).to_string();
        let url = self
            .href
            .as_deref()
            .map(|href| strip_query(href).to_string())
            .unwrap_or_default();

        let mut item = Item::new(id, url);
        item.img_urls = self.img_urls;

        if let Some(overlay) = self.overlay.as_deref() {
            let parsed = parse_overlay_title(overlay);
            item.description = parsed.description;
            for (key, value) in parsed.fields {
                match key.as_str() {
                    "price" => item.price = value,
                    "brand" => item.brand = value,
                    "size" => item.size = value,
                    "condition" => item.condition = value,
                    _ => item.set_extra(&key, value),
                }
            }
        }

        // The rendered card text is more reliable than the overlay attribute
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(price) = self.price.filter(|p| !p.is_empty()) {
            item.price = price;
        }
        item.set_extra("subtitle", self.subtitle.unwrap_or_default());
        if self.closet {
            item.set_extra("closet", "true");
        }

        item
    }
}

impl SiteAdapter for Vinted {
    fn pagination(&self) -> Pagination {
        Pagination::Paged
    }

    fn search_endpoint(&self) -> &str {
        "https://www.vinted.com/catalog"
    }

    fn query_param(&self) -> &str {
        "search_text"
    }

    fn content_selector(&self) -> &str {
        "section[class=site-content]"
    }

    fn content_timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn interstitials(&self) -> &[&str] {
        &[
            "button[data-testid=domain-select-modal-close-button]",
            "button[id=onetrust-reject-all-handler]",
        ]
    }

    fn next_page_selector(&self) -> Option<&str> {
        Some("a[data-testid=catalog-pagination--next-page]")
    }

    fn card_selector(&self) -> Option<&str> {
        Some("div[class=new-item-box__container]")
    }

    fn listing_script(&self) -> &str {
        LISTING_SCRIPT
    }

    fn parse_listing(&self, raw: Value) -> Result<Vec<Item>> {
        let raw: Vec<RawItem> = parse_array(raw)?;
        Ok(raw.into_iter().map(RawItem::into_item).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_id_from_testid() {
        assert_eq!(item_id("product-item-id-4211806930"), "4211806930");
        assert_eq!(item_id("4211806930"), "4211806930");
        assert_eq!(item_id(""), "");
    }

    #[test]
    fn test_parse_item() {
        let raw = json!([{
            "testid": "product-item-id-4211806930",
            "closet": false,
            "href": "https://www.vinted.com/items/4211806930-gold-hoops?referrer=catalog",
            "overlay": "Gold hoops, small, price: €12.00, brand: Zara, size: One size",
            "title": "Zara",
            "subtitle": "One size · Very good",
            "price": "€12.00",
            "img_urls": ["https://images1.vinted.net/t/01_abc/f800/1.jpeg"]
        }]);

        let items = Vinted.parse_listing(raw).unwrap();
        let item = &items[0];
        assert_eq!(item.id, "4211806930");
        assert_eq!(item.url, "https://www.vinted.com/items/4211806930-gold-hoops");
        assert_eq!(item.description, "Gold hoops, small");
        assert_eq!(item.brand, "Zara");
        assert_eq!(item.size, "One size");
        assert_eq!(item.title, "Zara");
        assert_eq!(item.price, "€12.00");
        assert_eq!(item.extra("subtitle"), Some("One size · Very good"));
        assert_eq!(item.extra("closet"), None);
        assert_eq!(item.num_imgs(), 1);
    }

    #[test]
    fn test_card_price_overrides_overlay_price() {
        let raw = json!([{
            "testid": "closet-item-id-77",
            "closet": true,
            "overlay": "Bag, price: €10.00",
            "price": "€10.00 incl. fees"
        }]);
        let items = Vinted.parse_listing(raw).unwrap();
        assert_eq!(items[0].id, "77");
        assert_eq!(items[0].price, "€10.00 incl. fees");
        assert_eq!(items[0].extra("closet"), Some("true"));
    }

    #[test]
    fn test_overlay_key_named_like_field_survives_reload() {
        let raw = json!([{
            "testid": "product-item-id-8",
            "overlay": "Bag, price: €5.00, title: Leather bag",
            "title": "Bag"
        }]);
        let items = Vinted.parse_listing(raw).unwrap();
        assert_eq!(items[0].title, "Bag");
        assert_eq!(items[0].extra("extra_title"), Some("Leather bag"));

        let text = serde_json::to_string(&items[0]).unwrap();
        let back: Item = serde_json::from_str(&text).unwrap();
        assert_eq!(back, items[0]);
    }

    #[test]
    fn test_missing_overlay_leaves_fields_empty() {
        let raw = json!([{ "testid": "product-item-id-5" }]);
        let items = Vinted.parse_listing(raw).unwrap();
        assert_eq!(items[0].id, "5");
        assert!(items[0].description.is_empty());
        assert!(items[0].brand.is_empty());
        assert!(items[0].url.is_empty());
    }

    #[test]
    fn test_no_detail_support() {
        assert!(Vinted.detail_content_selector().is_none());
        assert!(Vinted.detail_script().is_none());
    }
}
