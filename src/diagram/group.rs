use std::collections::HashMap;

use super::types::FactorRecord;

/// Rows sharing one cause within a category, in input order.
#[derive(Debug, Clone)]
pub struct CauseGroup<'a> {
    pub name: &'a str,
    pub factors: Vec<&'a FactorRecord>,
}

#[derive(Debug, Clone)]
pub struct CategoryGroup<'a> {
    pub name: &'a str,
    pub causes: Vec<CauseGroup<'a>>,
}

/// Groups rows by category, then by cause.
///
/// Both levels are ordered by first appearance; rows keep their relative
/// order inside each cause.
pub fn group_rows(rows: &[FactorRecord]) -> Vec<CategoryGroup<'_>> {
    let mut categories: Vec<CategoryGroup<'_>> = Vec::new();
    let mut category_index: HashMap<&str, usize> = HashMap::new();
    let mut cause_index: Vec<HashMap<&str, usize>> = Vec::new();

    for row in rows {
        let category = row.category_name();
        let ci = *category_index.entry(category).or_insert_with(|| {
            categories.push(CategoryGroup {
                name: category,
                causes: Vec::new(),
            });
            cause_index.push(HashMap::new());
            categories.len() - 1
        });

        let cause = row.cause_name();
        let causes = &mut categories[ci].causes;
        let ki = *cause_index[ci].entry(cause).or_insert_with(|| {
            causes.push(CauseGroup {
                name: cause,
                factors: Vec::new(),
            });
            causes.len() - 1
        });
        causes[ki].factors.push(row);
    }

    categories
}
