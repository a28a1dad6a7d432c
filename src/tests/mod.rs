mod test_corpus;
mod test_run_project;
