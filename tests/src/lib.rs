#![cfg(test)]
mod pipeline;
mod responder;
