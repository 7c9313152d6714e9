// ==========================================
// Repository 层集成测试
// ==========================================
// 覆盖: 目录查询、复合键查找、累计窗口查询、报表数据源
// ==========================================


use site_daily_report::engine::PeriodWindow;
use site_daily_report::logging;
use site_daily_report::repository::{
    ActivityRepository, CatalogRepository, ReportSource, SqliteReportSource,
};
use test_helpers::{
    create_test_db, date, insert_equipment_use, insert_material_use, insert_work, seed_catalog,
    shared_conn,
};

#[test]
fn test_catalog_queries() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let catalog = CatalogRepository::new(shared_conn(&db_path));
    let ids = seed_catalog(&catalog);

    let all = catalog.list_companies().unwrap();
    let active = catalog.list_active_companies().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|c| c.id != ids.done_co));

    assert_eq!(catalog.list_materials().unwrap().len(), 3);
    assert_eq!(catalog.list_equipments().unwrap().len(), 2);
    assert_eq!(catalog.first_site().unwrap().unwrap().name, "Suwon A-1");
}

#[test]
fn test_equipment_lookup_by_composite_key() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let catalog = CatalogRepository::new(shared_conn(&db_path));
    let ids = seed_catalog(&catalog);

    let excavator = catalog.find_equipment_by_key("Excavator", Some("0.6W")).unwrap();
    assert_eq!(excavator.map(|e| e.id), Some(ids.excavator));

    // 规格为 NULL 的装备只能以 None 匹配
    assert_eq!(
        catalog.find_equipment_by_key("Crane", None).unwrap().map(|e| e.id),
        Some(ids.crane)
    );
    assert!(catalog.find_equipment_by_key("Crane", Some("")).unwrap().is_none());
    assert!(catalog.find_equipment_by_key("Excavator", None).unwrap().is_none());
}

#[test]
fn test_cumulative_window_queries_exclude_future_rows() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = shared_conn(&db_path);
    let catalog = CatalogRepository::new(conn.clone());
    let activity = ActivityRepository::new(conn);
    let ids = seed_catalog(&catalog);

    let past = insert_work(&db_path, "2024-03-14", ids.rebar_co, 5, "Columns");
    let today = insert_work(&db_path, "2024-03-15", ids.form_co, 3, "Forms");
    let future = insert_work(&db_path, "2024-03-16", ids.form_co, 9, "Later");
    insert_equipment_use(&db_path, past, ids.crane, 1);
    insert_equipment_use(&db_path, today, ids.crane, 2);
    insert_equipment_use(&db_path, future, ids.crane, 4);
    insert_material_use(&db_path, "2024-03-16", ids.cement, 10.0);

    let personnel = activity.personnel_until(date("2024-03-15")).unwrap();
    assert_eq!(personnel.iter().map(|r| r.personnel_count).sum::<i64>(), 8);

    // 装备日期取自所属作业记录
    let equipment = activity.equipment_usage_until(date("2024-03-15")).unwrap();
    let dates: Vec<_> = equipment.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![date("2024-03-14"), date("2024-03-15")]);
    assert_eq!(equipment[0].specification, None);

    assert!(activity.material_usage_until(date("2024-03-15")).unwrap().is_empty());

    let log = activity.work_log_on(date("2024-03-15")).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].company_name, "Apex");
    assert_eq!(log[0].trade, "Formwork");
}

#[test]
fn test_report_source_loads_window_in_one_pass() {
    logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = shared_conn(&db_path);
    let catalog = CatalogRepository::new(conn.clone());
    let ids = seed_catalog(&catalog);

    insert_work(&db_path, "2024-03-14", ids.rebar_co, 5, "Columns");
    insert_work(&db_path, "2024-03-15", ids.form_co, 3, "Forms");
    insert_material_use(&db_path, "2024-03-15", ids.cement, 2.5);

    let source = SqliteReportSource::new(conn);
    let window = PeriodWindow::parse("2024-03-15").unwrap();

    let dataset = source.load_dataset(&window).unwrap();

    assert_eq!(dataset.site.map(|s| s.name).as_deref(), Some("Suwon A-1"));
    assert_eq!(dataset.companies.len(), 3);
    assert_eq!(dataset.personnel.len(), 2);
    assert_eq!(dataset.material_usage[0].quantity.thousandths(), 2_500);
    assert_eq!(dataset.today_log.len(), 1);
    assert_eq!(dataset.previous_log.len(), 1);
    assert_eq!(dataset.previous_log[0].description, "Columns");

    let (site, log) = source.load_day_log(date("2024-03-16")).unwrap();
    assert!(site.is_some());
    assert!(log.is_empty());
}
