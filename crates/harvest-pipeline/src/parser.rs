use crate::error::{Result, StageError};
use harvest_core::{ItemRecord, SelectorConfig};
use scraper::{ElementRef, Html, Selector};

/// Compile a CSS selector, reporting which one was invalid.
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| StageError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{}", e),
    })
}

/// Extracts an [`ItemRecord`] from an item profile page.
///
/// Each field is looked up on its own; a missing element only nulls that
/// field.
pub struct ItemPageParser {
    name: Selector,
    phones_container: Selector,
    phone_link: Selector,
    address: Selector,
    site_container: Selector,
    site_link: Selector,
    social_container: Selector,
    social_link: Selector,
}

impl ItemPageParser {
    pub fn new(selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            name: parse_selector(&selectors.name)?,
            phones_container: parse_selector(&selectors.phones_container)?,
            phone_link: parse_selector(&selectors.phone_link)?,
            address: parse_selector(&selectors.address)?,
            site_container: parse_selector(&selectors.site_container)?,
            site_link: parse_selector(&selectors.site_link)?,
            social_container: parse_selector(&selectors.social_container)?,
            social_link: parse_selector(&selectors.social_link)?,
        })
    }

    pub fn parse(&self, url: &str, html: &str) -> ItemRecord {
        let document = Html::parse_document(html);
        let root = document.root_element();

        ItemRecord {
            name: self.name(root),
            url: url.to_string(),
            phones: self.phones(root),
            address: self.address(root),
            site: self.site(root),
            social_networks: self.social_networks(root),
        }
    }

    fn name(&self, root: ElementRef) -> Option<String> {
        root.select(&self.name).next().map(element_text)
    }

    fn phones(&self, root: ElementRef) -> Option<Vec<String>> {
        let container = root.select(&self.phones_container).next()?;
        container
            .select(&self.phone_link)
            .map(|link| link.value().attr("href").map(strip_phone_scheme))
            .collect()
    }

    fn address(&self, root: ElementRef) -> Option<String> {
        root.select(&self.address).next().map(element_text)
    }

    fn site(&self, root: ElementRef) -> Option<String> {
        root.select(&self.site_container)
            .next()?
            .select(&self.site_link)
            .next()
            .map(element_text)
    }

    fn social_networks(&self, root: ElementRef) -> Option<Vec<String>> {
        let container = root.select(&self.social_container).next()?;
        container
            .select(&self.social_link)
            .map(|link| link.value().attr("href").and_then(decode_redirect_target))
            .collect()
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// `tel:+7 (812) 000-00-00` -> `+7 (812) 000-00-00`
pub fn strip_phone_scheme(href: &str) -> String {
    href.split_once(':')
        .map_or(href, |(_, number)| number)
        .trim()
        .to_string()
}

/// Pull the real destination out of a `/redirect/?to=<encoded>&hash=...` link.
pub fn decode_redirect_target(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("?to=")?;
    let encoded = rest.split('&').next().unwrap_or(rest);
    let decoded = urlencoding::decode_binary(encoded.as_bytes());
    Some(String::from_utf8_lossy(&decoded).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = r#"<h1><span itemprop="name"> Clinic Nord </span></h1>"#;
    const PHONES: &str = r#"<div class="service-phones-list">
            <a class="js-phone-number" href="tel:+78121234567">call</a>
            <a class="js-phone-number" href="tel: +78127654321 ">call</a>
            <a class="other" href="tel:000">skip</a>
        </div>"#;
    const ADDRESS: &str = r#"<address class="iblock">
            Nevsky pr., 1
        </address>"#;
    const SITE: &str =
        r#"<div class="service-website-value"><a href="/redirect">clinic-nord.test</a></div>"#;
    const SOCIAL: &str = r#"<div class="service-description-social-list">
            <a href="/redirect/?to=https%3A%2F%2Fvk.com%2Fclinic&amp;hash=abc">vk</a>
            <a href="/redirect/?to=https%3A%2F%2Ft.me%2Fclinic">tg</a>
        </div>"#;

    fn parser() -> ItemPageParser {
        ItemPageParser::new(&SelectorConfig::default()).expect("default selectors compile")
    }

    fn page(parts: &[&str]) -> String {
        format!("<html><body>{}</body></html>", parts.join("\n"))
    }

    #[test]
    fn test_parse_full_page() {
        let html = page(&[NAME, PHONES, ADDRESS, SITE, SOCIAL]);
        let record = parser().parse("https://a.test/clinic", &html);

        assert_eq!(record.name.as_deref(), Some("Clinic Nord"));
        assert_eq!(record.url, "https://a.test/clinic");
        assert_eq!(
            record.phones,
            Some(vec!["+78121234567".to_string(), "+78127654321".to_string()])
        );
        assert_eq!(record.address.as_deref(), Some("Nevsky pr., 1"));
        assert_eq!(record.site.as_deref(), Some("clinic-nord.test"));
        assert_eq!(
            record.social_networks,
            Some(vec![
                "https://vk.com/clinic".to_string(),
                "https://t.me/clinic".to_string()
            ])
        );
    }

    #[test]
    fn test_every_field_combination_is_isolated() {
        let parts = [NAME, PHONES, ADDRESS, SITE, SOCIAL];
        let parser = parser();
        let full = parser.parse("u", &page(&parts));

        for mask in 0u8..32 {
            let present: Vec<&str> = parts
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, p)| *p)
                .collect();
            let record = parser.parse("u", &page(&present));
            let has = |i: u8| mask & (1 << i) != 0;

            assert_eq!(record.url, "u");
            assert_eq!(record.name, full.name.clone().filter(|_| has(0)), "mask {mask}");
            assert_eq!(record.phones, full.phones.clone().filter(|_| has(1)), "mask {mask}");
            assert_eq!(record.address, full.address.clone().filter(|_| has(2)), "mask {mask}");
            assert_eq!(record.site, full.site.clone().filter(|_| has(3)), "mask {mask}");
            assert_eq!(
                record.social_networks,
                full.social_networks.clone().filter(|_| has(4)),
                "mask {mask}"
            );
        }
    }

    #[test]
    fn test_empty_containers_yield_empty_lists() {
        let html = page(&[
            r#"<div class="service-phones-list"></div>"#,
            r#"<div class="service-description-social-list"></div>"#,
        ]);
        let record = parser().parse("u", &html);
        assert_eq!(record.phones, Some(vec![]));
        assert_eq!(record.social_networks, Some(vec![]));
    }

    #[test]
    fn test_site_container_without_link() {
        let html = page(&[r#"<div class="service-website-value">n/a</div>"#]);
        assert_eq!(parser().parse("u", &html).site, None);
    }

    #[test]
    fn test_malformed_social_link_nulls_only_that_field() {
        let html = page(&[
            NAME,
            r#"<div class="service-description-social-list"><a href="https://vk.com/x">vk</a></div>"#,
        ]);
        let record = parser().parse("u", &html);
        assert_eq!(record.social_networks, None);
        assert_eq!(record.name.as_deref(), Some("Clinic Nord"));
    }

    #[test]
    fn test_strip_phone_scheme() {
        assert_eq!(strip_phone_scheme("tel:+78121234567"), "+78121234567");
        assert_eq!(strip_phone_scheme(" tel: 8 800 "), "8 800");
        assert_eq!(strip_phone_scheme("tel:+7:ext"), "+7:ext");
        assert_eq!(strip_phone_scheme("+78121234567"), "+78121234567");
    }

    #[test]
    fn test_decode_redirect_target() {
        assert_eq!(
            decode_redirect_target("/r/?to=https%3A%2F%2Fvk.com%2Fa%3Fb%3D1&x=2").as_deref(),
            Some("https://vk.com/a?b=1")
        );
        assert_eq!(
            decode_redirect_target("/r/?to=https%3A%2F%2Fok.ru").as_deref(),
            Some("https://ok.ru")
        );
        assert_eq!(decode_redirect_target("/r/?url=x"), None);
    }

    #[test]
    fn test_invalid_selector() {
        let selectors = SelectorConfig {
            name: "span[".to_string(),
            ..SelectorConfig::default()
        };
        let err = ItemPageParser::new(&selectors).err().expect("should fail");
        assert!(matches!(err, StageError::InvalidSelector { selector, .. } if selector == "span["));
    }
}
