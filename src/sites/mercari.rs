use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::app::Result;
use crate::domain::{Item, ItemDetail, Pagination};
use crate::sites::{parse_array, strip_query, SiteAdapter};

/// mercari.com: one infinitely scrolling result grid.
pub struct Mercari;

const LISTING_SCRIPT: &str = r#"
(() => Array.from(
    document.querySelectorAll('div[id][data-itemprice][data-itemstatus]')
).map(div => {
    const a = div.querySelector('a[data-testid=ProductThumbWrapper]');
    const metas = {};
    if (a) {
        a.querySelectorAll('meta').forEach(m => {
            const prop = m.getAttribute('itemprop');
            const content = m.getAttribute('content');
            if (prop && content !== null) metas[prop] = content;
        });
    }
    const decoration = a ? a.querySelector('span[data-testid=ItemDecorationRectangle]') : null;
    const price = div.querySelector('p[data-testid=ProductThumbItemPrice]');
    const img = div.querySelector('div[class^=Product__CDNImageWrapper] > img');
    return {
        id: div.getAttribute('id'),
        status: div.getAttribute('data-itemstatus'),
        href: a ? a.href : null,
        metas: metas,
        decoration: decoration ? decoration.innerText : null,
        price: price ? price.innerText : null,
        thumbnail: img ? img.src : null,
    };
}))()
"#;

const DETAIL_SCRIPT: &str = r#"
(() => Array.from(
    document.querySelectorAll('div[class^=PhotoIndicators__ImageWrapper] > img')
).map(img => img.src))()
"#;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawItem {
    id: Option<String>,
    status: Option<String>,
    href: Option<String>,
    metas: HashMap<String, String>,
    decoration: Option<String>,
    price: Option<String>,
    thumbnail: Option<String>,
}

impl RawItem {
    fn into_item(self) -> Item {
        let url = self
            .href
            .as_deref()
            .map(|href| strip_query(href).trim_end_matches('/').to_string())
            .unwrap_or_default();

        let mut item = Item::new(self.id.unwrap_or_default(), url);
        item.price = self.price.unwrap_or_default();

        let mut metas = self.metas;
        item.brand = metas.remove("brand").unwrap_or_default();
        item.condition = metas.remove("itemCondition").unwrap_or_default();
        item.description = metas.remove("description").unwrap_or_default();
        item.set_extra("category", metas.remove("category").unwrap_or_default());
        item.set_extra("color", metas.remove("color").unwrap_or_default());
        item.set_extra("status", self.status.unwrap_or_default());
        item.set_extra("decoration", self.decoration.unwrap_or_default());

        if let Some(src) = self.thumbnail.filter(|s| !s.is_empty()) {
            item.img_urls.push(full_size_image(&src));
        }

        item
    }
}

/// Thumbnail URLs point at a downscaled copy under `thumb/`.
fn full_size_image(src: &str) -> String {
    strip_query(src).replacen("thumb/", "", 1)
}

impl SiteAdapter for Mercari {
    fn pagination(&self) -> Pagination {
        Pagination::Scroll
    }

    fn search_endpoint(&self) -> &str {
        "https://www.mercari.com/search/"
    }

    fn query_param(&self) -> &str {
        "keyword"
    }

    fn content_selector(&self) -> &str {
        "div[data-testid=Search-Items]"
    }

    fn content_timeout(&self) -> Duration {
        Duration::from_secs(8)
    }

    fn interstitials(&self) -> &[&str] {
        &["button[id=truste-consent-button]"]
    }

    fn listing_script(&self) -> &str {
        LISTING_SCRIPT
    }

    fn parse_listing(&self, raw: Value) -> Result<Vec<Item>> {
        let raw: Vec<RawItem> = parse_array(raw)?;
        Ok(raw.into_iter().map(RawItem::into_item).collect())
    }

    fn detail_content_selector(&self) -> Option<&str> {
        Some("div[data-testid=ItemDetailColPhotos]")
    }

    fn detail_script(&self) -> Option<&str> {
        Some(DETAIL_SCRIPT)
    }

    fn parse_detail(&self, raw: Value) -> Result<ItemDetail> {
        let srcs: Vec<Option<String>> = parse_array(raw)?;
        Ok(ItemDetail {
            img_urls: srcs
                .into_iter()
                .flatten()
                .filter(|s| !s.is_empty())
                .map(|s| strip_query(&s).to_string())
                .collect(),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_item() {
        let raw = json!([{
            "id": "m81234567",
            "status": "on_sale",
            "href": "https://www.mercari.com/us/item/m81234567/?ref=search_results",
            "metas": {
                "category": "Tops",
                "brand": "Nike",
                "itemCondition": "Good",
                "description": "Vintage tee",
                "color": "Black"
            },
            "decoration": "Free shipping",
            "price": "$18",
            "thumbnail": "https://u-mercari-images.mercdn.net/photos/thumb/m81234567_1.jpg?1700000000"
        }]);

        let items = Mercari.parse_listing(raw).unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id, "m81234567");
        assert_eq!(item.url, "https://www.mercari.com/us/item/m81234567");
        assert_eq!(item.brand, "Nike");
        assert_eq!(item.condition, "Good");
        assert_eq!(item.description, "Vintage tee");
        assert_eq!(item.price, "$18");
        assert_eq!(item.extra("category"), Some("Tops"));
        assert_eq!(item.extra("color"), Some("Black"));
        assert_eq!(item.extra("status"), Some("on_sale"));
        assert_eq!(item.extra("decoration"), Some("Free shipping"));
        assert_eq!(
            item.img_urls,
            vec!["https://u-mercari-images.mercdn.net/photos/m81234567_1.jpg"]
        );
    }

    #[test]
    fn test_missing_fields_still_emit_item() {
        let raw = json!([{ "id": "m1", "href": null, "metas": {} }]);
        let items = Mercari.parse_listing(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "m1");
        assert!(items[0].url.is_empty());
        assert!(items[0].price.is_empty());
        assert!(items[0].img_urls.is_empty());
        assert!(items[0].extra.is_empty());
    }

    #[test]
    fn test_parse_detail_strips_query() {
        let raw = json!([
            "https://u-mercari-images.mercdn.net/photos/m1_1.jpg?123",
            "https://u-mercari-images.mercdn.net/photos/m1_2.jpg?123",
            null
        ]);
        let detail = Mercari.parse_detail(raw).unwrap();
        assert_eq!(
            detail.img_urls,
            vec![
                "https://u-mercari-images.mercdn.net/photos/m1_1.jpg",
                "https://u-mercari-images.mercdn.net/photos/m1_2.jpg",
            ]
        );
    }

    #[test]
    fn test_search_url() {
        let query = crate::domain::Query::new("T-Shirt").exclude("Dress").exclude("Long");
        let url = Mercari.search_url(&query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.mercari.com/search/?keyword=T-Shirt+-Dress+-Long"
        );
    }
}
