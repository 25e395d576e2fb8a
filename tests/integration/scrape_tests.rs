use super::*;
use discogs_watcher::models::ConditionRank;
use discogs_watcher::{ListingScraper, WantCriteria};

fn offer(id: u32, media: &str, seller: &str, price: &str, shipping: &str, converted: &str) -> String {
    format!(
        r#"<tr class="shortcut_navigable">
            <td class="item_description">
                <strong><a href="/sell/item/{id}" class="item_description_title">Artist - Album</a></strong>
                <p class="item_condition">
                    <span class="mplabel">Media:</span>
                    <span class="mplabel">Media</span>
                    <span>{media}</span>
                    <br>
                    <span class="mplabel">Sleeve:</span>
                    <span class="mplabel">Sleeve</span>
                    <span class="item_sleeve_condition">Very Good (VG)</span>
                </p>
            </td>
            <td class="seller_info">
                <ul>
                    <li><strong><a href="/seller/{seller}">{seller}</a></strong></li>
                    <li>99.5%</li>
                    <li><span>Ships From:</span> Japan </li>
                </ul>
            </td>
            <td class="item_price">
                <span class="price">{price}</span>
                <span class="item_shipping">{shipping}</span>
                <span class="converted_price">{converted}</span>
            </td>
        </tr>"#
    )
}

async fn mount_release_page(server: &MockServer) {
    let rows = [
        offer(101, "Mint (M)", "tokyo_records", "¥3000", "+¥1000 shipping", "about A$40.00"),
        offer(102, "Good Plus (G+)", "bargain_bin", "¥500", "+¥500 shipping", "about A$9.00"),
        offer(103, "Near Mint (NM or M-)", "spammer", "¥1000", "+¥0 shipping", "about A$12.00"),
    ]
    .concat();

    Mock::given(method("GET"))
        .and(path("/sell/release/249504"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html><body><table><tbody>{}</tbody></table></body></html>", rows)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scrape_release_reconstructs_prices() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_release_page(&server).await;

    let config = get_test_config(&server.uri());
    let scraper = ListingScraper::new(&config.scraper)?;
    let listings = scraper.scrape_release("249504").await?;

    assert_eq!(listings.len(), 3);
    assert_eq!(listings[0].id, "101");
    assert_eq!(listings[0].seller, "tokyo_records");
    assert_eq!(listings[0].location, "Japan");
    // 3000 / (3000 + 1000) * 4000
    assert_eq!(listings[0].price, 3000);
    assert_eq!(listings[0].media_condition, ConditionRank::Mint);
    assert_eq!(listings[0].sleeve_condition, ConditionRank::VeryGood);

    assert_eq!(listings[1].price, 450);
    assert_eq!(listings[2].price, 1200);
    Ok(())
}

#[tokio::test]
async fn test_scrape_release_with_want_criteria() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_release_page(&server).await;

    let config = get_test_config(&server.uri());
    let scraper = ListingScraper::new(&config.scraper)?;
    let listings = scraper.scrape_release("249504").await?;

    let criteria = WantCriteria {
        max_price: Some(2000),
        min_media_condition: ConditionRank::VeryGoodPlus,
        min_sleeve_condition: ConditionRank::Good,
        blocked_sellers: vec!["spammer".to_string()],
    };

    // 101 is too expensive, 102 too worn, 103 blocked.
    assert!(criteria.filter(listings.clone()).is_empty());

    let relaxed = WantCriteria {
        blocked_sellers: Vec::new(),
        ..criteria
    };
    let wanted = relaxed.filter(listings);
    assert_eq!(wanted.len(), 1);
    assert_eq!(wanted[0].id, "103");
    Ok(())
}

#[tokio::test]
async fn test_scrape_missing_release() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = get_test_config(&server.uri());
    let scraper = ListingScraper::new(&config.scraper)?;

    assert!(scraper.scrape_release("1").await.is_err());
    Ok(())
}
