mod config;
mod persistence;
mod suggest;
mod workflow;
