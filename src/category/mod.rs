//! Transaction categories and the page for managing them.

mod categories_page;
mod core;
mod create_endpoint;
mod delete_endpoint;

pub use categories_page::{CategoriesViewState, get_categories_page};
pub use core::{
    Category, DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES, create_category,
    create_category_table, create_default_categories, delete_category, get_categories,
};
pub use create_endpoint::{CreateCategoryState, create_category_endpoint};
pub use delete_endpoint::{DeleteCategoryState, delete_category_endpoint};
