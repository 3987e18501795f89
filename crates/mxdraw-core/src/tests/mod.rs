mod edge;
mod import;
mod xml;
