//! PostgreSQL menu
//!
//! Statements are sent through `psql -c`. Names and SQL typed at the prompts
//! are placed into the statement text as given, without quoting, so anything
//! typed there runs with the connecting role's privileges.

use async_trait::async_trait;
use opsmenu_core::{CommandInvocation, Result};

use crate::gate::Gate;
use crate::menu::{Action, ActionContext, Menu, MenuItem};

#[derive(Debug, Clone, Copy)]
enum PostgresAction {
    ListDatabases,
    CreateDatabase,
    CreateUser,
    Grant,
    RunSql,
    Shell,
    DropDatabase,
    DropUser,
}

pub fn menu() -> Menu {
    Menu::new(
        "PostgreSQL",
        vec![
            MenuItem::new("List Databases", PostgresAction::ListDatabases),
            MenuItem::new("Create Database", PostgresAction::CreateDatabase),
            MenuItem::new("Create User", PostgresAction::CreateUser),
            MenuItem::new("Grant Privileges", PostgresAction::Grant),
            MenuItem::new("Run SQL", PostgresAction::RunSql),
            MenuItem::new("Open psql Shell", PostgresAction::Shell),
            MenuItem::destructive("Drop Database", PostgresAction::DropDatabase),
            MenuItem::destructive("Drop User", PostgresAction::DropUser),
        ],
    )
}

/// `psql` with the configured connection flags
fn psql(ctx: &ActionContext<'_>) -> CommandInvocation {
    CommandInvocation::new("psql").flags(ctx.settings().postgres.connection_flags())
}

/// `psql ... -d <database> -c <sql>`, stopping at the first error
fn statement(ctx: &ActionContext<'_>, database: &str, sql: String) -> CommandInvocation {
    psql(ctx)
        .flags(["-v", "ON_ERROR_STOP=1", "-d", database, "-c"])
        .target(sql)
}

async fn execute_sql(ctx: &mut ActionContext<'_>, database: &str, sql: String) -> Result<()> {
    let invocation = statement(ctx, database, sql);
    if ctx.run(&invocation).await?.success() {
        ctx.console().success("Done")?;
    }
    Ok(())
}

fn maintenance_db(ctx: &ActionContext<'_>) -> String {
    ctx.settings().postgres.maintenance_db.clone()
}

#[async_trait]
impl Action for PostgresAction {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<()> {
        let maintenance = maintenance_db(ctx);
        match self {
            PostgresAction::ListDatabases => {
                let list = psql(ctx).flag("-l");
                ctx.run(&list).await?;
            }
            PostgresAction::CreateDatabase => {
                let name = ctx.console().prompt_required("Database name").await?;
                let owner = ctx
                    .console()
                    .prompt("Owner (leave empty for the connecting user)")
                    .await?;
                let sql = if owner.is_empty() {
                    format!("CREATE DATABASE {}", name)
                } else {
                    format!("CREATE DATABASE {} OWNER {}", name, owner)
                };
                execute_sql(ctx, &maintenance, sql).await?;
            }
            PostgresAction::CreateUser => {
                let name = ctx.console().prompt_required("User name").await?;
                let password = ctx.console().prompt_required("Password").await?;
                let sql = format!("CREATE USER {} WITH PASSWORD '{}'", name, password);
                execute_sql(ctx, &maintenance, sql).await?;
            }
            PostgresAction::Grant => {
                let database = ctx.console().prompt_required("Database name").await?;
                let user = ctx.console().prompt_required("User name").await?;
                let sql = format!("GRANT ALL PRIVILEGES ON DATABASE {} TO {}", database, user);
                execute_sql(ctx, &maintenance, sql).await?;
            }
            PostgresAction::RunSql => {
                let database = ctx
                    .console()
                    .prompt_default("Database", &maintenance)
                    .await?;
                let sql = ctx.console().prompt_required("SQL").await?;
                execute_sql(ctx, &database, sql).await?;
            }
            PostgresAction::Shell => {
                let database = ctx
                    .console()
                    .prompt_default("Database", &maintenance)
                    .await?;
                let shell = psql(ctx).flag("-d").target(database);
                ctx.run(&shell).await?;
            }
            PostgresAction::DropDatabase => {
                let name = ctx.console().prompt_required("Database to drop").await?;
                ctx.confirm(&Gate::double(
                    format!("Drop database {} and all of its data?", name),
                    "This cannot be undone. Are you sure?",
                ))
                .await?;
                execute_sql(ctx, &maintenance, format!("DROP DATABASE {}", name)).await?;
            }
            PostgresAction::DropUser => {
                let name = ctx.console().prompt_required("User to drop").await?;
                ctx.confirm(&Gate::double(
                    format!("Drop user {}?", name),
                    "This cannot be undone. Are you sure?",
                ))
                .await?;
                execute_sql(ctx, &maintenance, format!("DROP USER {}", name)).await?;
            }
        }
        Ok(())
    }
}
