mod find_terms;
mod term_frequencies;
