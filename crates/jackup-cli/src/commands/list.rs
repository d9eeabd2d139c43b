//! Listing profiles and their tasks

use colored::Colorize;

use crate::context::Context;
use crate::error::Result;
use crate::output::{Cell, Table};

/// Run the list command
///
/// Without names, prints every profile and its task count. With names,
/// prints each profile's tasks in the order a sync would run them.
pub fn run_list(ctx: &Context, profiles: &[String]) -> Result<()> {
    let controller = ctx.controller();

    if profiles.is_empty() {
        let overview = controller.profile_overview()?;
        if overview.is_empty() {
            println!(
                "No profiles in {}. Use {} to create one.",
                ctx.config.dir.display().to_string().cyan(),
                "jackup add".cyan()
            );
            return Ok(());
        }

        let mut table = Table::new(&["profile", "tasks"]);
        for (name, count) in overview {
            table.add_row(vec![Cell::from(name), Cell::from(count.to_string())]);
        }
        print!("{}", table.render());
        return Ok(());
    }

    for (i, profile) in profiles.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let tasks = controller.tasks_in_run_order(profile)?;
        println!("{}", profile.bold());

        let mut table = Table::new(&["task", "source", "destination", "order"]);
        for task in tasks {
            table.add_row(vec![
                Cell::from(task.name),
                Cell::from(task.source),
                Cell::from(task.destination),
                Cell::from(task.order.to_string()),
            ]);
        }
        if table.is_empty() {
            println!("  {}", "no tasks".dimmed());
        } else {
            print!("{}", table.render());
        }
    }

    Ok(())
}
