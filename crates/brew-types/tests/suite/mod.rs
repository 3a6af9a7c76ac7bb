mod capture;
mod members;
mod substitution;
