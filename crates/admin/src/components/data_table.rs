//! Data table configuration for the manage pages.
//!
//! Each manage page renders one table; its config names the columns, the
//! search placeholder and the empty state.

/// Column definition for a data table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    /// Display label for the column header.
    pub label: &'static str,
    /// Extra CSS class for the header cell.
    pub class: &'static str,
}

impl TableColumn {
    #[must_use]
    pub const fn new(label: &'static str) -> Self {
        Self { label, class: "" }
    }

    /// Narrow, centred column (ids, switches, actions).
    #[must_use]
    pub const fn compact(label: &'static str) -> Self {
        Self {
            label,
            class: "col-compact",
        }
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTableConfig {
    /// Table name; also the fence key and the DOM id prefix.
    pub table_id: &'static str,
    /// Manage page path, e.g. `/products`.
    pub base_path: &'static str,
    /// Page heading.
    pub title: &'static str,
    pub columns: Vec<TableColumn>,
    pub search_placeholder: &'static str,
    /// Shown when the page has no rows.
    pub empty_title: &'static str,
}

impl DataTableConfig {
    #[must_use]
    pub const fn new(table_id: &'static str, base_path: &'static str, title: &'static str) -> Self {
        Self {
            table_id,
            base_path,
            title,
            columns: Vec::new(),
            search_placeholder: "Tìm kiếm...",
            empty_title: "Không có dữ liệu",
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Set search placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &'static str) -> Self {
        self.search_placeholder = placeholder;
        self
    }

    /// Fragment endpoint for this table.
    #[must_use]
    pub fn table_url(&self) -> String {
        format!("{}/table", self.base_path)
    }

    /// Client-side event that makes the table refetch itself.
    #[must_use]
    pub fn refresh_event(&self) -> String {
        format!("{}-refresh", self.table_id)
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Confirmation shown before a row is deleted.
#[must_use]
pub fn delete_confirm(noun: &str, id: impl std::fmt::Display) -> String {
    format!("Bạn có chắc chắn muốn xóa {noun} #{id}?")
}

/// Build the admins table configuration.
#[must_use]
pub fn admins_table_config() -> DataTableConfig {
    DataTableConfig::new("admins", "/admins", "Quản lý Tài khoản")
        .column(TableColumn::compact("ID"))
        .column(TableColumn::new("Tên đăng nhập"))
        .column(TableColumn::new("Họ và tên"))
        .column(TableColumn::compact("Hoạt động"))
        .column(TableColumn::compact("Thao tác"))
        .search_placeholder("Tìm kiếm theo tên đăng nhập...")
}

/// Build the categories table configuration.
#[must_use]
pub fn categories_table_config() -> DataTableConfig {
    DataTableConfig::new("categories", "/categories", "Quản lý Danh mục")
        .column(TableColumn::compact("ID"))
        .column(TableColumn::new("Tên danh mục"))
        .column(TableColumn::new("Mô tả"))
        .column(TableColumn::compact("Đang bán"))
        .column(TableColumn::compact("Thao tác"))
        .search_placeholder("Tìm kiếm theo tên danh mục...")
}

/// Build the customers table configuration.
#[must_use]
pub fn customers_table_config() -> DataTableConfig {
    DataTableConfig::new("customers", "/customers", "Quản lý Khách hàng")
        .column(TableColumn::compact("ID"))
        .column(TableColumn::new("Họ và tên"))
        .column(TableColumn::new("Email"))
        .column(TableColumn::new("Số điện thoại"))
        .column(TableColumn::compact("Hoạt động"))
        .column(TableColumn::compact("Thao tác"))
        .search_placeholder("Tìm kiếm theo tên, email, SDT...")
}

/// Build the products table configuration.
#[must_use]
pub fn products_table_config() -> DataTableConfig {
    DataTableConfig::new("products", "/products", "Quản lý Sản phẩm")
        .column(TableColumn::compact("ID"))
        .column(TableColumn::compact("Ảnh"))
        .column(TableColumn::new("Tên sản phẩm"))
        .column(TableColumn::new("Giá"))
        .column(TableColumn::compact("Đang bán"))
        .column(TableColumn::compact("Số lượng"))
        .column(TableColumn::compact("Thao tác"))
        .search_placeholder("Tìm kiếm theo tên sản phẩm...")
}

/// Build the stores table configuration.
#[must_use]
pub fn stores_table_config() -> DataTableConfig {
    DataTableConfig::new("stores", "/stores", "Quản lý Cửa hàng")
        .column(TableColumn::compact("ID"))
        .column(TableColumn::new("Tên cửa hàng"))
        .column(TableColumn::new("Tên đăng nhập"))
        .column(TableColumn::new("Số điện thoại"))
        .column(TableColumn::new("Địa chỉ"))
        .column(TableColumn::compact("Hoạt động"))
        .column(TableColumn::compact("Thao tác"))
        .search_placeholder("Tìm kiếm theo tên cửa hàng...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_table_columns() {
        let config = products_table_config();
        let labels: Vec<_> = config.columns.iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            ["ID", "Ảnh", "Tên sản phẩm", "Giá", "Đang bán", "Số lượng", "Thao tác"]
        );
        assert_eq!(config.table_url(), "/products/table");
    }

    #[test]
    fn test_table_ids_are_unique() {
        let ids = [
            admins_table_config().table_id,
            categories_table_config().table_id,
            customers_table_config().table_id,
            products_table_config().table_id,
            stores_table_config().table_id,
        ];
        for (i, id) in ids.iter().enumerate() {
            assert!(!ids.iter().skip(i + 1).any(|other| other == id));
        }
    }

    #[test]
    fn test_refresh_event_name() {
        assert_eq!(admins_table_config().refresh_event(), "admins-refresh");
    }
}
