//! Two installations sharing one remote store

use std::path::Path;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use pocketbook::config::{PocketbookPaths, Settings};
use pocketbook::models::{DateStamp, Money, RecordType, RepeatingPeriod, TableName};
use pocketbook::remote::{MemoryRemoteStore, RemoteStore};
use pocketbook::services::{
    AccountService, BudgetDraft, BudgetService, CategoryService, RecordDraft, RecordItem,
    RecordService, SyncService, TransferDraft,
};
use pocketbook::storage::{initialize_storage, LocalStore};
use pocketbook::sync::{Repositories, SyncOutcome};
use tempfile::TempDir;

fn settings_for(remote_dir: &Path) -> Settings {
    Settings {
        user_id: Some("alice".into()),
        remote_dir: Some(remote_dir.to_path_buf()),
        ..Settings::default()
    }
}

/// Same sequence as `pocketbook init`: pull, write defaults, push them
fn init_device(store: &LocalStore, repos: &Repositories) {
    SyncService::new(repos).synchronize_all().unwrap();
    initialize_storage(store).unwrap();
    SyncService::new(repos).synchronize_all().unwrap();
}

fn open_store(base: &Path) -> LocalStore {
    let store = LocalStore::new(PocketbookPaths::with_base_dir(base.to_path_buf())).unwrap();
    store.load_all().unwrap();
    store
}

fn date(s: &str) -> DateStamp {
    DateStamp::parse(s).unwrap()
}

#[test]
fn second_device_sees_budgets_of_the_first() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_for(&temp_dir.path().join("remote"));

    let store_a = open_store(&temp_dir.path().join("a"));
    let device_a = Repositories::from_settings(&store_a, &settings);
    init_device(&store_a, &device_a);

    let cash = AccountService::new(&device_a)
        .create("Cash", "USD", Money::from_units(1000))
        .unwrap();
    let housing = CategoryService::new(&device_a).find("Housing").unwrap().unwrap();
    BudgetService::new(&device_a)
        .create(BudgetDraft {
            name: "Home".into(),
            amount_limit: Money::from_units(4000),
            repeating_period: RepeatingPeriod::Monthly,
            category_id: Some(housing.id),
            linked_account_ids: vec![cash.id],
        })
        .unwrap();
    RecordService::new(&device_a)
        .save_records(&RecordDraft {
            date: date("2024-03-10"),
            record_type: RecordType::Expense,
            account_id: cash.id,
            items: vec![RecordItem::new(Money::from_units(516)).with_category(housing.id)],
        })
        .unwrap();

    let store_b = open_store(&temp_dir.path().join("b"));
    let device_b = Repositories::from_settings(&store_b, &settings);
    init_device(&store_b, &device_b);

    assert_eq!(
        device_b.categories.get_all().unwrap(),
        device_a.categories.get_all().unwrap()
    );
    let reference = date("2024-03-20").to_datetime().unwrap();
    let budgets = BudgetService::new(&device_b)
        .budgets_by_period(reference)
        .unwrap();
    let home = &budgets.get(RepeatingPeriod::Monthly)[0];
    assert_eq!(home.used_amount, Money::from_units(516));
    assert!((home.used_percentage - 12.9).abs() < 1e-9);

    let balance = AccountService::new(&device_b).get(cash.id).unwrap().unwrap().balance;
    assert_eq!(balance, Money::from_units(484));

    // Stamps are millisecond based; keep the second device's write strictly later.
    sleep(Duration::from_millis(5));
    RecordService::new(&device_b).delete_stack(1).unwrap();

    let report = SyncService::new(&device_a).synchronize_all().unwrap();
    assert!(report
        .tables
        .contains(&(TableName::Record, SyncOutcome::Pulled(0))));
    assert!(RecordService::new(&device_a).list(None, None).unwrap().is_empty());
    assert_eq!(
        AccountService::new(&device_a).get(cash.id).unwrap().unwrap().balance,
        Money::from_units(1000)
    );
}

#[test]
fn deleting_an_account_converts_transfers_everywhere() {
    let temp_dir = TempDir::new().unwrap();
    let remote: Arc<dyn RemoteStore> = Arc::new(MemoryRemoteStore::new());

    let store_a = open_store(&temp_dir.path().join("a"));
    let device_a = Repositories::new(&store_a, Some((remote.clone(), "alice".into())));
    init_device(&store_a, &device_a);

    let accounts = AccountService::new(&device_a);
    let cash = accounts.create("Cash", "USD", Money::from_units(100)).unwrap();
    let card = accounts.create("Card", "USD", Money::zero()).unwrap();
    for day in ["2024-03-01", "2024-03-02"] {
        RecordService::new(&device_a)
            .save_transfer(&TransferDraft {
                date: date(day),
                from_account_id: cash.id,
                to_account_id: card.id,
                amount: Money::from_units(10),
                received_amount: None,
            })
            .unwrap();
    }

    let deletion = accounts.delete(card.id).unwrap();
    assert_eq!(deletion.removed_records.len(), 2);
    assert_eq!(deletion.converted_records.len(), 2);

    let store_b = open_store(&temp_dir.path().join("b"));
    let device_b = Repositories::new(&store_b, Some((remote, "alice".into())));
    init_device(&store_b, &device_b);

    let records = RecordService::new(&device_b).list(None, None).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.account_id == cash.id
        && record.record_type == RecordType::OutTransfer
        && record.counterpart_account_id().is_none()));
    assert_eq!(
        AccountService::new(&device_b).list(true).unwrap().len(),
        1
    );
}

#[test]
fn offline_writes_leave_local_data_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let remote = Arc::new(MemoryRemoteStore::new());

    let store = open_store(&temp_dir.path().join("a"));
    let repos = Repositories::new(&store, Some((remote.clone(), "alice".into())));
    init_device(&store, &repos);
    let writes = remote.write_count();

    remote.set_offline(true);
    let err = AccountService::new(&repos)
        .create("Cash", "USD", Money::zero())
        .unwrap_err();
    assert!(err.is_remote());
    assert!(SyncService::new(&repos).synchronize_all().is_err());

    remote.set_offline(false);
    assert!(AccountService::new(&repos).list(true).unwrap().is_empty());
    assert_eq!(remote.write_count(), writes);
    assert_eq!(
        SyncService::new(&repos).synchronize_all().unwrap().changed().count(),
        0
    );
}

#[test]
fn devices_set_up_offline_adopt_the_first_shared_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let remote: Arc<dyn RemoteStore> = Arc::new(MemoryRemoteStore::new());

    let store_a = open_store(&temp_dir.path().join("a"));
    let store_b = open_store(&temp_dir.path().join("b"));
    initialize_storage(&store_a).unwrap();
    initialize_storage(&store_b).unwrap();
    AccountService::new(&Repositories::local_only(&store_b))
        .create("Wallet", "EUR", Money::from_units(20))
        .unwrap();
    assert_ne!(
        store_a.categories().get_all().unwrap(),
        store_b.categories().get_all().unwrap()
    );

    let device_a = Repositories::new(&store_a, Some((remote.clone(), "alice".into())));
    let report = SyncService::new(&device_a).synchronize_all().unwrap();
    assert!(report
        .tables
        .iter()
        .any(|(table, outcome)| {
            *table == TableName::Category && matches!(outcome, SyncOutcome::Pushed(_))
        }));

    let device_b = Repositories::new(&store_b, Some((remote, "alice".into())));
    let report = SyncService::new(&device_b).synchronize_all().unwrap();
    assert!(report
        .tables
        .iter()
        .any(|(table, outcome)| {
            *table == TableName::Category && matches!(outcome, SyncOutcome::Pulled(_))
        }));
    assert!(report
        .tables
        .contains(&(TableName::Account, SyncOutcome::Pushed(1))));
    assert_eq!(
        device_b.categories.get_all().unwrap(),
        device_a.categories.get_all().unwrap()
    );
    assert_eq!(
        device_b.widgets.get_all().unwrap(),
        device_a.widgets.get_all().unwrap()
    );

    let report = SyncService::new(&device_a).synchronize_all().unwrap();
    assert_eq!(
        report.changed().collect::<Vec<_>>(),
        vec![&(TableName::Account, SyncOutcome::Pulled(1))]
    );
    assert_eq!(
        SyncService::new(&device_b).synchronize_all().unwrap().changed().count(),
        0
    );
}
