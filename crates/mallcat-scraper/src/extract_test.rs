use super::*;

fn selectors(item: &[&str]) -> CompiledSelectors {
    let to_vec = |v: &[&str]| v.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();
    CompiledSelectors::compile(&SelectorConfig {
        item: to_vec(item),
        name: to_vec(&[".name", ".productName a"]),
        price: to_vec(&[".price span", ".price"]),
        original_price: to_vec(&[".price strike"]),
        image: to_vec(&["img"]),
        link: to_vec(&[".name a", ".productName a"]),
    })
    .unwrap()
}

const LISTING: &str = r#"
<html><body>
  <div class="product_cell">
    <div class="viewImage"><img src="/data/goods/101.jpg"></div>
    <p class="productName"><a href="/index.php?num=101">[명인] 포기김치 5kg</a></p>
    <div class="price"><strike>18,600원</strike> <span>16,740원</span></div>
  </div>
  <div class="product_cell">
    <div class="viewImage"><img src="//cdn.k-kimchi.kr/blank.gif" data-src="/data/goods/102.jpg"></div>
    <p class="productName"><a href="view.php?num=102">깍두기 2kg</a></p>
    <div class="price"><span>품절</span></div>
  </div>
  <div class="product_cell">
    <p class="productName"></p>
    <div class="price"><span>9,900원</span></div>
  </div>
</body></html>
"#;

#[test]
fn extracts_items_in_document_order() {
    let products = extract_products(
        LISTING,
        &selectors(&[".product-item", ".product_cell"]),
        "https://www.k-kimchi.kr/",
        Some("포기김치"),
    );

    // The nameless third cell is dropped.
    assert_eq!(products.len(), 2);

    let first = &products[0];
    assert_eq!(first.name, "[명인] 포기김치 5kg");
    assert_eq!(first.price_text, "16,740원");
    assert_eq!(first.original_price_text, "18,600원");
    assert_eq!(first.image_src, "https://www.k-kimchi.kr/data/goods/101.jpg");
    assert_eq!(first.link_href, "https://www.k-kimchi.kr/index.php?num=101");
    assert_eq!(first.category.as_deref(), Some("포기김치"));

    let second = &products[1];
    assert_eq!(second.name, "깍두기 2kg");
    // "품절" is only two characters, so no price candidate is plausible.
    assert_eq!(second.price_text, "");
    assert_eq!(second.original_price_text, "");
    // `src` is tried first and is plausible, so the placeholder wins.
    assert_eq!(second.image_src, "https://cdn.k-kimchi.kr/blank.gif");
    assert_eq!(second.link_href, "https://www.k-kimchi.kr/view.php?num=102");
}

#[test]
fn anchor_items_fall_back_to_own_href() {
    let html = r#"<div class="grid">
        <a class="card" href="/goods/view.php?goodsNo=77"><span class="name">제주 감귤 5kg</span><span class="price">25,000원</span></a>
    </div>"#;
    let products = extract_products(
        html,
        &selectors(&["a.card"]),
        "https://mall.example.kr",
        None,
    );
    assert_eq!(products.len(), 1);
    assert_eq!(
        products[0].link_href,
        "https://mall.example.kr/goods/view.php?goodsNo=77"
    );
    assert!(products[0].category.is_none());
}

#[test]
fn page_without_item_matches_is_empty() {
    let products = extract_products(
        "<html><body><p>준비중입니다</p></body></html>",
        &selectors(&[".product_cell"]),
        "https://mall.example.kr",
        None,
    );
    assert!(products.is_empty());
}
