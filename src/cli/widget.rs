//! Widget and navigation CLI commands

use clap::Subcommand;

use crate::display::budget::format_budget_table;
use crate::display::personalization::{format_navigation_bar, format_widget_list};
use crate::error::{PocketbookError, PocketbookResult};
use crate::models::{BudgetsByPeriod, NavScreen, WidgetName};
use crate::services::{BudgetService, PersonalizationService};
use crate::sync::Repositories;

/// Widget subcommands
#[derive(Subcommand)]
pub enum WidgetCommands {
    /// List home-screen widgets, the navigation bar, and pinned budgets
    List,

    /// Show or hide a widget
    Set {
        /// Widget name (e.g., "recent-records")
        name: String,
        /// Hide the widget instead of showing it
        #[arg(long)]
        hidden: bool,
    },

    /// Move a shown widget to a position (1 is first)
    Move {
        /// Widget name
        name: String,
        /// New position
        position: usize,
    },

    /// Pin budgets to the chosen-budgets widget, replacing the current pins
    Pin {
        /// Budget names or IDs
        budgets: Vec<String>,
    },

    /// Swap two navigation buttons
    SwapNav {
        /// First screen (e.g., "records")
        first: String,
        /// Second screen
        second: String,
    },
}

fn parse_widget(input: &str) -> PocketbookResult<WidgetName> {
    WidgetName::parse(input).ok_or_else(|| {
        let names: Vec<String> = WidgetName::ALL
            .iter()
            .map(|name| format!("{:?}", name))
            .collect();
        PocketbookError::Validation(format!(
            "Unknown widget: '{}'. Valid widgets: {}",
            input,
            names.join(", ")
        ))
    })
}

fn parse_screen(input: &str) -> PocketbookResult<NavScreen> {
    NavScreen::parse(input)
        .ok_or_else(|| PocketbookError::Validation(format!("Unknown screen: '{}'", input)))
}

/// Handle a widget command
pub fn handle_widget_command(repos: &Repositories, cmd: WidgetCommands) -> PocketbookResult<()> {
    let service = PersonalizationService::new(repos);

    match cmd {
        WidgetCommands::List => {
            println!("Widgets:");
            print!("{}", format_widget_list(&service.widgets()?));
            println!();
            println!("Navigation:");
            print!("{}", format_navigation_bar(&service.navigation_buttons()?));

            let pinned = service.budgets_on_widget()?;
            if !pinned.is_empty() {
                println!();
                println!("Pinned budgets:");
                let reference = chrono::Local::now().naive_local();
                let records = repos.records.get_all()?;
                let budgets = BudgetsByPeriod::from_budgets(pinned)
                    .with_date_ranges(reference)
                    .fill_used_amounts_by_records(&records);
                print!("{}", format_budget_table(&budgets));
            }
        }

        WidgetCommands::Set { name, hidden } => {
            let name = parse_widget(&name)?;
            service.set_widget(name, !hidden)?;
            println!("{} {}", if hidden { "Hid" } else { "Showing" }, name);
        }

        WidgetCommands::Move { name, position } => {
            let name = parse_widget(&name)?;
            service.move_widget(name, position.saturating_sub(1))?;
            print!("{}", format_widget_list(&service.widgets()?));
        }

        WidgetCommands::Pin { budgets } => {
            let budget_service = BudgetService::new(repos);
            let ids = budgets
                .iter()
                .map(|b| {
                    budget_service
                        .find(b)?
                        .map(|found| found.id)
                        .ok_or_else(|| PocketbookError::budget_not_found(b.as_str()))
                })
                .collect::<PocketbookResult<Vec<_>>>()?;
            service.save_budgets_on_widget(&ids)?;
            println!("Pinned {} budget(s)", ids.len());
        }

        WidgetCommands::SwapNav { first, second } => {
            service.swap_navigation_buttons(parse_screen(&first)?, parse_screen(&second)?)?;
            print!("{}", format_navigation_bar(&service.navigation_buttons()?));
        }
    }

    Ok(())
}
