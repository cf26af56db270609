//! Integration tests for `MallScraper::scrape` against a mock mall.

use std::collections::BTreeMap;

use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mallcat_core::{CategoryPage, MallConfig, PaginationConfig, PriceConvention, SelectorConfig};
use mallcat_scraper::{MallClient, MallScraper, RetryPolicy};

fn test_client() -> MallClient {
    MallClient::new(5, "mallcat-test/0.1", RetryPolicy::none())
        .expect("failed to build test MallClient")
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_owned()).collect()
}

fn mock_mall(base_url: &str, categories: &[(&str, &str)], max_pages: u32) -> MallConfig {
    MallConfig {
        id: "mock".to_owned(),
        name: "모의몰".to_owned(),
        base_url: base_url.to_owned(),
        region: "전라남도".to_owned(),
        tags: vec![],
        default_category: None,
        category_map: BTreeMap::new(),
        category_pages: categories
            .iter()
            .map(|(name, url)| CategoryPage {
                name: (*name).to_owned(),
                url: format!("{base_url}{url}"),
            })
            .collect(),
        pagination: Some(PaginationConfig {
            param: "page".to_owned(),
            max_pages,
        }),
        price_convention: PriceConvention::StripAll,
        product_id_pattern: None,
        request_delay_ms: Some(0),
        selectors: SelectorConfig {
            item: strings(&[".product-item", ".goods-item", "ul.prdList > li"]),
            name: strings(&[".product-name", ".item-name", ".goods-title", ".title", "h3"]),
            price: strings(&[".price"]),
            original_price: strings(&[".consumer"]),
            image: strings(&["img"]),
            link: strings(&["a"]),
        },
    }
}

fn listing(items: &[(u32, &str, &str)]) -> String {
    let lis: String = items
        .iter()
        .map(|(no, name, price)| {
            format!(
                r#"<li><a href="/product/detail.html?product_no={no}"><img src="/web/{no}.jpg"></a>
                   <p class="goods-title">{name}</p><span class="price">{price}</span></li>"#
            )
        })
        .collect();
    format!(r#"<html><body><ul class="prdList">{lis}</ul></body></html>"#)
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

#[tokio::test]
async fn scrape_follows_pages_until_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param_is_missing("page"))
        .respond_with(html(listing(&[(1, "고흥 유자청 1kg", "15,000원"), (2, "녹차 티백", "8,000원")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", "2"))
        .respond_with(html(listing(&[(3, "무화과 잼", "12,000원")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", "3"))
        .respond_with(html(listing(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client();
    let mall = mock_mall(&server.uri(), &[("가공식품", "/list?cate=1")], 5);
    let report = MallScraper::new(&client, &mall, 0).unwrap().scrape().await;

    assert_eq!(report.mall_id, "mock");
    assert_eq!(report.pages_fetched, 3);
    assert!(report.failures.is_empty());
    let names: Vec<&str> = report.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["고흥 유자청 1kg", "녹차 티백", "무화과 잼"]);
    assert_eq!(report.products[0].category.as_deref(), Some("가공식품"));
    assert_eq!(
        report.products[0].link_href,
        format!("{}/product/detail.html?product_no=1", server.uri())
    );
}

#[tokio::test]
async fn scrape_stops_when_page_repeats_items() {
    let server = MockServer::start().await;

    // Malls that ignore the page parameter serve the same listing forever.
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(html(listing(&[(1, "고흥 유자청 1kg", "15,000원")])))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client();
    let mall = mock_mall(&server.uri(), &[("가공식품", "/list")], 10);
    let report = MallScraper::new(&client, &mall, 0).unwrap().scrape().await;

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.products.len(), 1);
}

#[tokio::test]
async fn scrape_records_failure_and_continues_with_next_category() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fruit"))
        .respond_with(html(listing(&[(9, "나주 배 5kg", "32,000원")])))
        .mount(&server)
        .await;

    let client = test_client();
    let mall = mock_mall(
        &server.uri(),
        &[("수산물", "/broken"), ("농산물", "/fruit")],
        1,
    );
    let report = MallScraper::new(&client, &mall, 0).unwrap().scrape().await;

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].url.ends_with("/broken"));
    assert!(report.failures[0].error.contains("500"));
    assert_eq!(report.products.len(), 1);
    assert_eq!(report.products[0].category.as_deref(), Some("농산물"));
}

#[tokio::test]
async fn scrape_dedups_items_across_categories() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(listing(&[(1, "고흥 유자청 1kg", "15,000원")])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html(listing(&[(1, "고흥 유자청 1kg", "15,000원"), (4, "유자차 선물세트", "30,000원")])))
        .mount(&server)
        .await;

    let client = test_client();
    let mall = mock_mall(&server.uri(), &[("가공식품", "/a"), ("선물세트", "/b")], 1);
    let report = MallScraper::new(&client, &mall, 0).unwrap().scrape().await;

    assert_eq!(report.products.len(), 2);
    assert_eq!(report.products[0].category.as_deref(), Some("가공식품"));
    assert_eq!(report.products[1].name, "유자차 선물세트");
}

#[tokio::test]
async fn scrape_without_categories_uses_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing(&[(5, "장흥 표고버섯", "22,000원")])))
        .mount(&server)
        .await;

    let client = test_client();
    let mall = mock_mall(&server.uri(), &[], 1);
    let report = MallScraper::new(&client, &mall, 0).unwrap().scrape().await;

    assert_eq!(report.products.len(), 1);
    assert!(report.products[0].category.is_none());
}

#[tokio::test]
async fn invalid_selector_fails_construction() {
    let client = test_client();
    let mut mall = mock_mall("https://mall.example.kr", &[], 1);
    mall.selectors.item = strings(&["li["]);
    assert!(MallScraper::new(&client, &mall, 0).is_err());
}

#[tokio::test]
async fn fetch_homepage_returns_front_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><body>메인</body></html>".to_owned()))
        .mount(&server)
        .await;

    let client = test_client();
    let mall = mock_mall(&server.uri(), &[], 1);
    let body = MallScraper::new(&client, &mall, 0)
        .unwrap()
        .fetch_homepage()
        .await
        .unwrap();
    assert!(body.contains("메인"));
}
