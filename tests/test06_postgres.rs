#![cfg(feature = "postgres")]

use std::env;

use sql_tx_batch::postgres::create_pool;
use sql_tx_batch::prelude::*;

/// Connection settings from the environment; the test is skipped when `TESTING_PG_HOST` is unset.
fn postgres_config() -> Option<deadpool_postgres::Config> {
    let host = env::var("TESTING_PG_HOST").ok()?;
    let mut cfg = deadpool_postgres::Config::new();
    cfg.host = Some(host);
    cfg.port = Some(
        env::var("TESTING_PG_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5432),
    );
    cfg.dbname = Some(env::var("TESTING_PG_DB").unwrap_or_else(|_| "testing".to_string()));
    cfg.user = Some(env::var("TESTING_PG_USER").unwrap_or_else(|_| "testuser".to_string()));
    cfg.password = Some(env::var("TESTING_PG_PASSWORD").unwrap_or_default());
    Some(cfg)
}

#[tokio::test]
async fn postgres_batch_commits_and_classifies_errors() -> Result<(), SqlTxError> {
    let Some(cfg) = postgres_config() else {
        eprintln!("TESTING_PG_HOST not set, skipping Postgres transaction test");
        return Ok(());
    };
    let pool = create_pool(&cfg)?;
    let mut conn = PostgresTxConnection::from_pool(&pool).await?;

    let mut setup = Transaction::new();
    setup.append("drop table if exists tx_batch_account");
    setup.append("create table tx_batch_account(id bigint primary key, balance bigint not null)");
    assert!(TransactionExecutor::default().execute(&mut conn, &mut setup).await);

    let mut tx = Transaction::new();
    tx.append("insert into tx_batch_account(id, balance) values (1, 0)");
    tx.append_prepared_statement(PreparedStatement::with_params(
        "update tx_batch_account set balance = balance + $1 where id = $2",
        vec![RowValues::Int(25), RowValues::Int(1)],
    ));
    assert!(TransactionExecutor::default().execute(&mut conn, &mut tx).await);

    let mut duplicate = Transaction::new();
    duplicate.append("insert into tx_batch_account(id, balance) values (2, 5)");
    duplicate.append("insert into tx_batch_account(id, balance) values (1, 5)");
    assert_eq!(
        conn.execute_transaction(&duplicate).await,
        TxResultCode::OtherError("23505".into())
    );
    assert!(!TransactionExecutor::default().execute(&mut conn, &mut duplicate).await);
    assert!(duplicate.is_cleaned_up());

    let client = conn.into_inner();
    let row = client
        .query_one("select count(*), max(balance) from tx_batch_account", &[])
        .await?;
    let count: i64 = row.get(0);
    let balance: i64 = row.get(1);
    assert_eq!(count, 1);
    assert_eq!(balance, 25);
    client.batch_execute("drop table tx_batch_account").await?;
    Ok(())
}
