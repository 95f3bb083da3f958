mod catalog;
mod compare;
mod eval;
mod generate;

use catalog::run_catalog;
use compare::run_compare;
use eval::run_eval;
use generate::run_generate;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Eval(args) => run_eval(args, ctx),
        Command::Compare(args) => run_compare(args, ctx),
        Command::Generate(args) => run_generate(args, ctx),
        Command::Catalog(args) => run_catalog(args, ctx),
    }
}
