//! Command implementations for the `storetree` binary

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use storetree_permissions::{
    Action, FileAccess, FileGrantSource, FileTree, PermissionConfig, PermissionIndex,
    PermissionManager, Session, UserId,
};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "storetree")]
#[command(about = "Resolve file-store permissions for a user")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a single action on one path; exits with status 2 when denied
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Key of the file or folder
        #[arg(short, long)]
        path: String,

        #[arg(short, long, value_enum)]
        action: ActionArg,
    },
    /// Print read/write/admin flags for every node
    List {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Where grants, tree and identity come from
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Store configuration (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Grant list (JSON array)
    #[arg(short, long)]
    pub grants: PathBuf,

    /// File tree (nested JSON)
    #[arg(short, long)]
    pub tree: PathBuf,

    /// Acting user, owner/name
    #[arg(short, long)]
    pub user: String,

    /// Treat the user as a local admin
    #[arg(long)]
    pub local_admin: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionArg {
    Read,
    Write,
    Admin,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Read => Action::Read,
            ActionArg::Write => Action::Write,
            ActionArg::Admin => Action::Admin,
        }
    }
}

/// Loaded grants, tree and session
pub struct Workspace {
    pub index: Option<Arc<PermissionIndex>>,
    pub tree: FileTree,
    pub session: Session,
}

impl Workspace {
    pub async fn load(args: &SourceArgs) -> Result<Self> {
        let config = PermissionConfig::load(&args.config)
            .with_context(|| format!("Failed to load config {}", args.config.display()))?;

        let user: UserId = args
            .user
            .parse()
            .with_context(|| format!("Invalid user {}", args.user))?;

        let tree_json = std::fs::read_to_string(&args.tree)
            .with_context(|| format!("Failed to read tree {}", args.tree.display()))?;
        let tree = FileTree::from_json(&tree_json).context("Failed to parse tree")?;

        let manager = PermissionManager::new(config, Arc::new(FileGrantSource::new(&args.grants)));
        let indexed = manager.refresh().await.context("Failed to load grants")?;
        debug!(indexed, nodes = tree.len(), "Workspace loaded");

        let session = Session {
            user,
            local_admin: args.local_admin,
        };

        Ok(Self {
            index: manager.snapshot(),
            tree,
            session,
        })
    }

    pub fn access(&self) -> FileAccess<'_> {
        FileAccess::new(self.index.as_deref(), &self.tree, &self.session)
    }
}

/// Resolve one action; `Ok(true)` when allowed
pub fn check(workspace: &Workspace, path: &str, action: Action) -> Result<bool> {
    let node = workspace.tree.require(path)?;
    Ok(workspace.access().allows(node, action))
}

/// One line per node: indented title, flags and the grants deciding each
/// allowed level
pub fn list(workspace: &Workspace) -> Vec<String> {
    let access = workspace.access();
    let resolver = access.resolver();

    workspace
        .tree
        .iter()
        .map(|(id, node)| {
            let summary = access.summary(id);
            let indent = "  ".repeat(workspace.tree.depth(id));
            let deciders: Vec<String> = Action::ALL
                .iter()
                .filter_map(|action| {
                    resolver
                        .matching_grant(&workspace.tree, id, *action, &workspace.session.user)
                        .map(|(_, grant)| format!("{}={}", action, grant.id()))
                })
                .collect();

            let mut line = format!("{} {}{}", summary, indent, node.key);
            if !deciders.is_empty() {
                line.push_str(&format!("  [{}]", deciders.join(", ")));
            }
            line
        })
        .collect()
}

/// Run a parsed command, returning the process exit code
pub async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check {
            source,
            path,
            action,
        } => {
            let workspace = Workspace::load(&source).await?;
            if check(&workspace, &path, action.into())? {
                println!("{}", "allowed".green());
                Ok(0)
            } else {
                println!("{}", "denied".red());
                Ok(2)
            }
        }
        Commands::List { source } => {
            let workspace = Workspace::load(&source).await?;
            for line in list(&workspace) {
                println!("{}", line);
            }
            Ok(0)
        }
    }
}
