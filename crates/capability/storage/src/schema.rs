//! 启动时建表（幂等）。
//!
//! 只覆盖会话核心读写的表；用户、会话 cookie、审计、忽略规则等表由管理面维护。

use crate::error::StorageError;
use sqlx::PgPool;

const STATEMENTS: &[&str] = &[
    "create table if not exists allowed_clients ( \
        client_id   text primary key, \
        description text, \
        created_at  timestamptz not null default now() \
    )",
    "alter table allowed_clients add column if not exists alive_enabled boolean not null default false",
    "alter table allowed_clients add column if not exists alive_command_id integer",
    "alter table allowed_clients add column if not exists alive_expected_response text",
    "create table if not exists clients ( \
        client_id    text primary key, \
        ip           inet, \
        port         integer, \
        status       text, \
        connected_at timestamptz, \
        last_seen    timestamptz \
    )",
    "alter table clients add column if not exists alive_status text",
    "create table if not exists messages ( \
        id          bigserial primary key, \
        client_id   text, \
        timestamp   timestamptz not null default now(), \
        direction   text not null, \
        message     text not null, \
        remote_ip   inet, \
        remote_port integer \
    )",
    "create index if not exists idx_messages_timestamp on messages (timestamp desc)",
    "create table if not exists tcp_commands ( \
        id          serial primary key, \
        name        text not null unique, \
        description text, \
        payload     text not null, \
        encoding    text not null check (encoding in ('ascii', 'hex', 'base64')), \
        append_null boolean default false, \
        append_cr   boolean default false, \
        append_lf   boolean default false, \
        admin_only  boolean default false, \
        enabled     boolean default true, \
        created_at  timestamptz default now() \
    )",
    "create index if not exists idx_tcp_commands_enabled on tcp_commands (enabled)",
    "create table if not exists client_commands ( \
        client_id  text not null references allowed_clients (client_id) on delete cascade, \
        command_id integer not null references tcp_commands (id) on delete cascade, \
        enabled    boolean default true, \
        primary key (client_id, command_id) \
    )",
];

/// 确保会话核心依赖的表与列存在。
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StorageError> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
