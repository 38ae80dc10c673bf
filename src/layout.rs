// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Diagram layout: convention-driven ordering rules and the assembler that
//! merges resolved topology and ordering decisions into the final document.

pub mod convention;
pub mod document;

mod assembler;

pub(crate) use assembler::assemble;
