// ==========================================
// 天气同步集成测试
// ==========================================
// 覆盖: 当日取数并缓存、过去日期不取数、接口失败写入占位快照、请求参数
// 工具: mockito 模拟短期预报接口
// ==========================================


use mockito::{Matcher, Server};
use site_daily_report::config::WeatherSettings;
use site_daily_report::domain::{SiteWeather, WeatherCondition, WeatherSnapshot};
use site_daily_report::repository::WeatherRepository;
use site_daily_report::weather::{KmaForecastClient, WeatherSync};
use std::sync::Arc;
use test_helpers::{create_test_db, date, forecast_body, kst, shared_conn};

const FORECAST_PATH: &str = "/1360000/VilageFcstInfoService_2.0/getVilageFcst";

fn settings(server_url: &str, service_key: &str) -> WeatherSettings {
    WeatherSettings {
        service_key: service_key.to_string(),
        base_url: format!("{}{}", server_url, FORECAST_PATH),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn build_sync(db_path: &str, settings: WeatherSettings) -> (WeatherSync, Arc<WeatherRepository>) {
    let repo = Arc::new(WeatherRepository::new(shared_conn(db_path)));
    let client = Arc::new(KmaForecastClient::new(settings).unwrap());
    (WeatherSync::new(repo.clone(), client), repo)
}

#[tokio::test]
async fn test_today_is_fetched_once_and_cached() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", FORECAST_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(forecast_body(&[
            ("TMN", "-3.0"),
            ("SKY", "3"),
            ("PTY", "0"),
            ("TMX", "8.0"),
        ]))
        .expect(1)
        .create_async()
        .await;

    let (sync, repo) = build_sync(&db_path, settings(&server.url(), "test-key"));

    let first = sync.snapshot_for(date("2024-03-15"), kst(2024, 3, 15, 9, 10)).await.unwrap();
    let second = sync.snapshot_for(date("2024-03-15"), kst(2024, 3, 15, 18, 0)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(first, second);

    let stored = repo.find_by_date(date("2024-03-15")).unwrap().unwrap();
    assert_eq!(stored.min_temp.as_deref(), Some("-3.0"));
    assert_eq!(stored.max_temp.as_deref(), Some("8.0"));
    assert_eq!(stored.condition, WeatherCondition::MostlyCloudy);
}

#[tokio::test]
async fn test_past_date_never_calls_upstream() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", FORECAST_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(forecast_body(&[("SKY", "1")]))
        .expect(0)
        .create_async()
        .await;

    let (sync, repo) = build_sync(&db_path, settings(&server.url(), "test-key"));

    let weather = sync.snapshot_for(date("2024-03-10"), kst(2024, 3, 15, 9, 0)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(weather, SiteWeather::Unavailable);
    assert!(repo.find_by_date(date("2024-03-10")).unwrap().is_none());
}

#[tokio::test]
async fn test_past_date_with_snapshot_is_returned() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let server = Server::new_async().await;
    let (sync, repo) = build_sync(&db_path, settings(&server.url(), "test-key"));

    let snapshot = WeatherSnapshot {
        date: date("2024-03-10"),
        min_temp: Some("1.0".to_string()),
        max_temp: Some("9.0".to_string()),
        condition: WeatherCondition::Rain,
    };
    repo.upsert(&snapshot).unwrap();

    let weather = sync.snapshot_for(date("2024-03-10"), kst(2024, 3, 15, 9, 0)).await.unwrap();

    assert_eq!(weather, SiteWeather::Recorded(snapshot));
}

#[tokio::test]
async fn test_server_error_writes_sentinel_snapshot() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", FORECAST_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let (sync, repo) = build_sync(&db_path, settings(&server.url(), "test-key"));

    let weather = sync.snapshot_for(date("2024-03-15"), kst(2024, 3, 15, 9, 0)).await.unwrap();
    // 占位快照已写入，同日不再重试
    sync.snapshot_for(date("2024-03-15"), kst(2024, 3, 15, 12, 0)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(weather, SiteWeather::Recorded(WeatherSnapshot::no_data(date("2024-03-15"))));
    assert_eq!(
        repo.find_by_date(date("2024-03-15")).unwrap(),
        Some(WeatherSnapshot::no_data(date("2024-03-15")))
    );
}

#[tokio::test]
async fn test_upstream_result_code_error_writes_sentinel_snapshot() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", FORECAST_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response":{"header":{"resultCode":"03","resultMsg":"NO_DATA"}}}"#)
        .create_async()
        .await;

    let (sync, _repo) = build_sync(&db_path, settings(&server.url(), "test-key"));

    let weather = sync.snapshot_for(date("2024-03-15"), kst(2024, 3, 15, 9, 0)).await.unwrap();

    assert_eq!(weather.snapshot().unwrap().condition, WeatherCondition::Unknown);
    assert_eq!(weather.snapshot().unwrap().min_temp, None);
}

#[tokio::test]
async fn test_missing_service_key_skips_request() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", FORECAST_PATH)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (sync, repo) = build_sync(&db_path, settings(&server.url(), ""));

    let weather = sync.snapshot_for(date("2024-03-15"), kst(2024, 3, 15, 9, 0)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(weather, SiteWeather::Recorded(WeatherSnapshot::no_data(date("2024-03-15"))));
    assert!(repo.find_by_date(date("2024-03-15")).unwrap().is_some());
}

#[tokio::test]
async fn test_request_uses_previous_day_issuance_after_midnight() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", FORECAST_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ServiceKey".into(), "test-key".into()),
            Matcher::UrlEncoded("pageNo".into(), "1".into()),
            Matcher::UrlEncoded("numOfRows".into(), "1000".into()),
            Matcher::UrlEncoded("dataType".into(), "JSON".into()),
            Matcher::UrlEncoded("base_date".into(), "20240314".into()),
            Matcher::UrlEncoded("base_time".into(), "2300".into()),
            Matcher::UrlEncoded("nx".into(), "60".into()),
            Matcher::UrlEncoded("ny".into(), "121".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(forecast_body(&[("SKY", "4"), ("PTY", "1")]))
        .expect(1)
        .create_async()
        .await;

    let (sync, _repo) = build_sync(&db_path, settings(&server.url(), "test-key"));

    let weather = sync.snapshot_for(date("2024-03-15"), kst(2024, 3, 15, 1, 30)).await.unwrap();

    mock.assert_async().await;
    let snapshot = weather.snapshot().unwrap();
    assert_eq!(snapshot.date, date("2024-03-15"));
    assert_eq!(snapshot.condition, WeatherCondition::Rain);
}
