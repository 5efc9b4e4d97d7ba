use crate::output::{print_json, print_table};
use clap::Subcommand;
use stagewise_core::{types::Role, user::NewUser};
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum UserSubcommand {
    /// List accounts (passwords are never shown)
    List,
    /// Create an account
    Add {
        username: String,
        #[arg(long)]
        password: String,
        /// admin or viewer (default: viewer)
        #[arg(long)]
        role: Option<String>,
        /// Display name (default: the username)
        #[arg(long)]
        name: Option<String>,
    },
}

pub fn run(root: &Path, subcommand: UserSubcommand, json: bool) -> anyhow::Result<()> {
    let mut store = super::open_store(root)?;
    match subcommand {
        UserSubcommand::List => {
            let users = store.users();
            if json {
                return print_json(&users);
            }
            let rows = users
                .iter()
                .map(|u| {
                    vec![
                        u.id.to_string(),
                        u.username.clone(),
                        u.role.to_string(),
                        u.name.clone(),
                    ]
                })
                .collect();
            print_table(&["ID", "USERNAME", "ROLE", "NAME"], rows);
        }
        UserSubcommand::Add {
            username,
            password,
            role,
            name,
        } => {
            let role = role.as_deref().map(str::parse::<Role>).transpose()?;
            let user = store.create_user(NewUser {
                username,
                password,
                role,
                name,
            })?;
            if json {
                return print_json(&user);
            }
            println!("created user {} ({}, id {})", user.username, user.role, user.id);
        }
    }
    Ok(())
}
