//! In-memory repository fakes and helpers shared by the unit tests.

use crate::{
    abstract_trait::{
        CatalogRepositoryTrait, DashboardRepositoryTrait, DynJwtService, NewUser,
        NotificationRepositoryTrait, NotificationServiceTrait, OrderRepositoryTrait,
        PaymentOutcome, ProductCacheTrait, ProductCommandRepositoryTrait,
        ProductQueryRepositoryTrait, QuoteRepositoryTrait, RefreshTokenRepositoryTrait, SaleRepositoryTrait,
        UserCommandRepositoryTrait, UserQueryRepositoryTrait, WarehouseRepositoryTrait,
    },
    config::Config,
    di::Repositories,
    domain::{
        CatalogKind, CurrentUser, OrderStatus, PaymentStatus, QuoteStatus, Role, StockError,
        StockKind,
        event::{Audience, DomainEvent, NewNotification},
        requests::{
            CatalogItemRequest, CreateOrderRequest, CreateProductRequest, CreateQuoteRequest,
            FindAllCatalog, FindAllOrders, FindAllProducts, FindAllPurchases, FindAllQuotes,
            FindAllSales, FindAllUsers, FindAllWarehouse, PurchaseRequest, RecordScope,
            UpdateProductRequest, UpdateUserRequest,
        },
        responses::{ApiResponse, DashboardResponse, NotificationResponse},
        stock::{
            AssemblyOutcome, PurchaseOutcome, SaleLine, apply_purchase, assembly_parts,
            check_assembly, ensure_positive_quantity, ensure_units, line_subtotal,
            merge_sale_lines,
        },
    },
    errors::{RepositoryError, ServiceError},
    handler::AppRouter,
    model::{
        CatalogEntry, CustomQuote, Notification, Order, Product, ProductComposition, Purchase,
        RefreshToken, Sale, SaleItem, User, WarehouseItem,
    },
    state::AppState,
};
use async_trait::async_trait;
use axum::Router;
use chrono::{NaiveDateTime, Utc};
use deadpool_redis::{Config as RedisPoolConfig, Runtime};
use prometheus_client::registry::Registry;
use shared::{cache::CacheStore, utils::Metrics};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::{Mutex, broadcast};

fn now() -> Option<NaiveDateTime> {
    Some(Utc::now().naive_utc())
}

fn in_scope(deleted_at: Option<NaiveDateTime>, scope: RecordScope) -> bool {
    match scope {
        RecordScope::All => true,
        RecordScope::Active => deleted_at.is_none(),
        RecordScope::Trashed => deleted_at.is_some(),
    }
}

fn next_id(len: usize) -> i32 {
    i32::try_from(len).unwrap() + 1
}

pub fn test_metrics() -> (Arc<Mutex<Metrics>>, Arc<Mutex<Registry>>) {
    (
        Arc::new(Mutex::new(Metrics::new())),
        Arc::new(Mutex::new(Registry::default())),
    )
}

/// Cache whose pool points at a closed port, so every lookup is a miss.
pub fn offline_cache() -> Arc<CacheStore> {
    let pool = RedisPoolConfig::from_url("redis://127.0.0.1:1/")
        .create_pool(Some(Runtime::Tokio1))
        .unwrap();
    Arc::new(CacheStore::new(pool))
}

/// Product cache double that records each eviction batch.
#[derive(Default)]
pub struct RecordingProductCache {
    evicted: Mutex<Vec<Vec<i32>>>,
}

impl RecordingProductCache {
    pub async fn evicted(&self) -> Vec<Vec<i32>> {
        self.evicted.lock().await.clone()
    }
}

#[async_trait]
impl ProductCacheTrait for RecordingProductCache {
    async fn invalidate(&self, product_ids: &[i32]) {
        let mut ids = product_ids.to_vec();
        ids.sort_unstable();
        self.evicted.lock().await.push(ids);
    }
}

/// Notification service double that only records what was published.
pub struct RecordingNotifications {
    events: Mutex<Vec<DomainEvent>>,
    sender: broadcast::Sender<NotificationResponse>,
}

impl Default for RecordingNotifications {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            sender: broadcast::channel(16).0,
        }
    }
}

impl RecordingNotifications {
    pub async fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().await.clone()
    }

    pub fn send(&self, notification: NotificationResponse) {
        let _ = self.sender.send(notification);
    }
}

#[async_trait]
impl NotificationServiceTrait for RecordingNotifications {
    async fn publish(&self, event: DomainEvent) {
        self.events.lock().await.push(event);
    }

    async fn find_for(
        &self,
        _user: &CurrentUser,
    ) -> Result<ApiResponse<Vec<NotificationResponse>>, ServiceError> {
        Ok(ApiResponse::success("Notifications retrieved", Vec::new()))
    }

    async fn mark_read(
        &self,
        _id: i32,
        _user: &CurrentUser,
    ) -> Result<ApiResponse<NotificationResponse>, ServiceError> {
        Err(RepositoryError::NotFound.into())
    }

    fn subscribe(&self) -> broadcast::Receiver<NotificationResponse> {
        self.sender.subscribe()
    }
}

#[derive(Default)]
pub struct FakeNotificationRepository {
    rows: Mutex<Vec<Notification>>,
}

impl FakeNotificationRepository {
    pub async fn stored(&self) -> Vec<Notification> {
        self.rows.lock().await.clone()
    }
}

fn addressed_to(row: &Notification, user: &CurrentUser) -> bool {
    row.user_id == Some(user.user_id) || row.target_role.as_deref() == Some(user.role.as_str())
}

#[async_trait]
impl NotificationRepositoryTrait for FakeNotificationRepository {
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let mut rows = self.rows.lock().await;
        let (user_id, target_role) = match notification.audience {
            Audience::User(id) => (Some(id), None),
            Audience::Role(role) => (None, Some(role.as_str().to_string())),
        };

        let row = Notification {
            notification_id: next_id(rows.len()),
            user_id,
            target_role,
            kind: notification.kind.to_string(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            is_read: false,
            created_at: now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find_for(
        &self,
        user: &CurrentUser,
        limit: i64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|row| addressed_to(row, user))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn mark_read(
        &self,
        id: i32,
        user: &CurrentUser,
    ) -> Result<Option<Notification>, RepositoryError> {
        let mut rows = self.rows.lock().await;
        Ok(rows
            .iter_mut()
            .find(|row| row.notification_id == id && addressed_to(row, user))
            .map(|row| {
                row.is_read = true;
                row.clone()
            }))
    }
}

#[derive(Default)]
struct WarehouseState {
    products: Vec<ProductComposition>,
    materials: Vec<(i32, String)>,
    fillings: Vec<(i32, String)>,
    rows: Vec<WarehouseItem>,
    purchases: Vec<Purchase>,
}

impl WarehouseState {
    fn position(&self, kind: StockKind, ref_id: i32) -> Option<usize> {
        self.rows.iter().position(|row| {
            row.kind == kind.as_str()
                && match kind {
                    StockKind::Product => row.product_id == Some(ref_id),
                    StockKind::Material => row.material_id == Some(ref_id),
                    StockKind::Filling => row.filling_id == Some(ref_id),
                }
        })
    }

    fn resolve(&self, kind: StockKind, name: &str) -> Option<(i32, String)> {
        match kind {
            StockKind::Product => self
                .products
                .iter()
                .find(|p| p.name == name)
                .map(|p| (p.product_id, p.name.clone())),
            StockKind::Material => self.materials.iter().find(|(_, n)| n == name).cloned(),
            StockKind::Filling => self.fillings.iter().find(|(_, n)| n == name).cloned(),
        }
    }

    fn push_row(&mut self, kind: StockKind, ref_id: i32, name: &str, stock: i32, cost: i64) -> usize {
        let (product_id, material_id, filling_id) = match kind {
            StockKind::Product => (Some(ref_id), None, None),
            StockKind::Material => (None, Some(ref_id), None),
            StockKind::Filling => (None, None, Some(ref_id)),
        };

        self.rows.push(WarehouseItem {
            warehouse_item_id: next_id(self.rows.len()),
            kind: kind.as_str().to_string(),
            name: name.to_string(),
            product_id,
            material_id,
            filling_id,
            stock,
            cost,
            created_at: now(),
            updated_at: now(),
        });
        self.rows.len() - 1
    }
}

/// Ledger fake with the same all-or-nothing rules as the SQL repository; one lock stands in
/// for the transaction.
pub struct FakeWarehouseRepository {
    state: Mutex<WarehouseState>,
}

impl FakeWarehouseRepository {
    /// One door product built from material "Roble" and filling "Panal", both stocked.
    pub fn with_door(product_name: &str, material_stock: i32, filling_stock: i32) -> Self {
        let mut state = WarehouseState {
            products: vec![ProductComposition {
                product_id: 1,
                name: product_name.to_string(),
                material_id: Some(1),
                material_name: Some("Roble".into()),
                filling_id: Some(1),
                filling_name: Some("Panal".into()),
            }],
            materials: vec![(1, "Roble".into())],
            fillings: vec![(1, "Panal".into())],
            ..Default::default()
        };
        state.push_row(StockKind::Material, 1, "Roble", material_stock, 0);
        state.push_row(StockKind::Filling, 1, "Panal", filling_stock, 0);

        Self {
            state: Mutex::new(state),
        }
    }

    pub async fn add_material(&self, name: &str) {
        let mut state = self.state.lock().await;
        let id = next_id(state.materials.len());
        state.materials.push((id, name.to_string()));
    }

    pub async fn rows(&self) -> Vec<WarehouseItem> {
        self.state.lock().await.rows.clone()
    }

    pub async fn purchases(&self) -> Vec<Purchase> {
        self.state.lock().await.purchases.clone()
    }

    pub async fn stock_snapshot(&self) -> Vec<(String, String, i32, i64)> {
        self.state
            .lock()
            .await
            .rows
            .iter()
            .map(|row| (row.kind.clone(), row.name.clone(), row.stock, row.cost))
            .collect()
    }
}

#[async_trait]
impl WarehouseRepositoryTrait for FakeWarehouseRepository {
    async fn find_all(
        &self,
        req: &FindAllWarehouse,
    ) -> Result<(Vec<WarehouseItem>, i64), RepositoryError> {
        let state = self.state.lock().await;
        let rows: Vec<WarehouseItem> = state
            .rows
            .iter()
            .filter(|row| req.kind.is_none_or(|kind| row.kind == kind.as_str()))
            .filter(|row| req.search.is_empty() || row.name.contains(&req.search))
            .cloned()
            .collect();
        let total = rows.len() as i64;
        Ok((rows, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<WarehouseItem>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .rows
            .iter()
            .find(|row| row.warehouse_item_id == id)
            .cloned())
    }

    async fn find_purchases(
        &self,
        _req: &FindAllPurchases,
    ) -> Result<(Vec<Purchase>, i64), RepositoryError> {
        let purchases = self.purchases().await;
        let total = purchases.len() as i64;
        Ok((purchases, total))
    }

    async fn assemble(
        &self,
        product_name: &str,
        quantity: i32,
    ) -> Result<AssemblyOutcome, RepositoryError> {
        ensure_positive_quantity(quantity)?;
        let mut state = self.state.lock().await;

        let composition = state
            .products
            .iter()
            .find(|p| p.name == product_name.trim())
            .cloned()
            .ok_or_else(|| StockError::ProductNotFound(product_name.to_string()))?;
        let parts = assembly_parts(&composition)?;

        let material = state.position(StockKind::Material, parts.material_id);
        let filling = state.position(StockKind::Filling, parts.filling_id);
        check_assembly(
            &parts,
            material.map(|i| &state.rows[i]),
            filling.map(|i| &state.rows[i]),
            quantity,
        )?;
        let (material, filling) = (material.unwrap(), filling.unwrap());

        state.rows[material].stock -= quantity;
        state.rows[filling].stock -= quantity;

        let (finished, finished_created) =
            match state.position(StockKind::Product, composition.product_id) {
                Some(i) => {
                    state.rows[i].stock += quantity;
                    (i, false)
                }
                None => (
                    state.push_row(
                        StockKind::Product,
                        composition.product_id,
                        &composition.name,
                        quantity,
                        0,
                    ),
                    true,
                ),
            };

        Ok(AssemblyOutcome {
            finished: state.rows[finished].clone(),
            material: state.rows[material].clone(),
            filling: state.rows[filling].clone(),
            finished_created,
        })
    }

    async fn register_purchase(
        &self,
        req: &PurchaseRequest,
        user_id: Option<i32>,
    ) -> Result<PurchaseOutcome, RepositoryError> {
        ensure_positive_quantity(req.quantity)?;
        let mut state = self.state.lock().await;

        let (ref_id, name) =
            state
                .resolve(req.kind, req.name.trim())
                .ok_or_else(|| StockError::ItemNotFound {
                    kind: req.kind,
                    name: req.name.clone(),
                })?;

        let existing = state.position(req.kind, ref_id);
        let (stock, cost) = apply_purchase(existing.map(|i| &state.rows[i]), req.quantity, req.cost)?;

        let index = match existing {
            Some(i) => {
                state.rows[i].stock = stock;
                state.rows[i].cost = cost;
                i
            }
            None => state.push_row(req.kind, ref_id, &name, stock, cost),
        };

        let purchase = Purchase {
            purchase_id: next_id(state.purchases.len()),
            warehouse_item_id: state.rows[index].warehouse_item_id,
            quantity: req.quantity,
            cost: req.cost,
            supplier: req.supplier.clone(),
            user_id,
            created_at: now(),
        };
        state.purchases.push(purchase.clone());

        Ok(PurchaseOutcome {
            item: state.rows[index].clone(),
            purchase,
            created: existing.is_none(),
        })
    }
}

#[derive(Default)]
pub struct FakeOrderRepository {
    orders: Mutex<Vec<Order>>,
    interleaved: Mutex<Option<OrderStatus>>,
}

impl FakeOrderRepository {
    pub async fn status_of(&self, id: i32) -> Option<String> {
        self.orders
            .lock()
            .await
            .iter()
            .find(|o| o.order_id == id)
            .map(|o| o.status.clone())
    }

    /// The next status update first sees a concurrent writer move the order to `status`.
    pub async fn interleave_status(&self, status: OrderStatus) {
        *self.interleaved.lock().await = Some(status);
    }
}

#[async_trait]
impl OrderRepositoryTrait for FakeOrderRepository {
    async fn create(
        &self,
        req: &CreateOrderRequest,
        created_by: Option<i32>,
    ) -> Result<Order, RepositoryError> {
        let mut orders = self.orders.lock().await;
        let order = Order {
            order_id: next_id(orders.len()),
            product_id: req.product_id,
            quantity: req.quantity,
            origin: req.origin.clone(),
            destination: req.destination.clone(),
            status: OrderStatus::Pendiente.as_str().to_string(),
            notes: req.notes.clone(),
            created_by,
            created_at: now(),
            updated_at: now(),
            deleted_at: None,
        };
        orders.push(order.clone());
        Ok(order)
    }

    async fn find_all(&self, req: &FindAllOrders) -> Result<(Vec<Order>, i64), RepositoryError> {
        let orders: Vec<Order> = self
            .orders
            .lock()
            .await
            .iter()
            .filter(|o| req.status.is_none_or(|s| o.status == s.as_str()))
            .cloned()
            .collect();
        let total = orders.len() as i64;
        Ok((orders, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, RepositoryError> {
        Ok(self
            .orders
            .lock()
            .await
            .iter()
            .find(|o| o.order_id == id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: i32,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let interleaved = self.interleaved.lock().await.take();
        let mut orders = self.orders.lock().await;
        let Some(order) = orders.iter_mut().find(|o| o.order_id == id) else {
            return Ok(None);
        };

        if let Some(status) = interleaved {
            order.status = status.as_str().to_string();
        }
        if order.status != from.as_str() {
            return Ok(None);
        }

        order.status = to.as_str().to_string();
        order.updated_at = now();
        Ok(Some(order.clone()))
    }
}

#[derive(Default)]
pub struct FakeQuoteRepository {
    quotes: Mutex<Vec<CustomQuote>>,
}

#[async_trait]
impl QuoteRepositoryTrait for FakeQuoteRepository {
    async fn create(
        &self,
        req: &CreateQuoteRequest,
        user_id: Option<i32>,
    ) -> Result<CustomQuote, RepositoryError> {
        let mut quotes = self.quotes.lock().await;
        let quote = CustomQuote {
            quote_id: next_id(quotes.len()),
            user_id,
            customer_name: req.customer_name.clone(),
            customer_email: req.customer_email.clone(),
            customer_phone: req.customer_phone.clone(),
            width_cm: req.width_cm,
            height_cm: req.height_cm,
            material_id: req.material_id,
            filling_id: req.filling_id,
            quantity: req.quantity,
            description: req.description.clone(),
            quoted_price: None,
            status: QuoteStatus::Pendiente.as_str().to_string(),
            created_at: now(),
            updated_at: now(),
        };
        quotes.push(quote.clone());
        Ok(quote)
    }

    async fn find_all(
        &self,
        req: &FindAllQuotes,
    ) -> Result<(Vec<CustomQuote>, i64), RepositoryError> {
        let quotes: Vec<CustomQuote> = self
            .quotes
            .lock()
            .await
            .iter()
            .filter(|q| req.status.is_none_or(|s| q.status == s.as_str()))
            .cloned()
            .collect();
        let total = quotes.len() as i64;
        Ok((quotes, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CustomQuote>, RepositoryError> {
        Ok(self
            .quotes
            .lock()
            .await
            .iter()
            .find(|q| q.quote_id == id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: i32,
        from: QuoteStatus,
        to: QuoteStatus,
        quoted_price: Option<i64>,
    ) -> Result<Option<CustomQuote>, RepositoryError> {
        let mut quotes = self.quotes.lock().await;
        Ok(quotes
            .iter_mut()
            .find(|q| q.quote_id == id && q.status == from.as_str())
            .map(|q| {
                q.status = to.as_str().to_string();
                if quoted_price.is_some() {
                    q.quoted_price = quoted_price;
                }
                q.updated_at = now();
                q.clone()
            }))
    }
}

#[derive(Default)]
struct SaleState {
    /// product id -> (unit price, stock)
    products: BTreeMap<i32, (i64, i32)>,
    sales: Vec<Sale>,
    items: Vec<SaleItem>,
}

#[derive(Default)]
pub struct FakeSaleRepository {
    state: Mutex<SaleState>,
}

impl FakeSaleRepository {
    pub async fn add_product(&self, id: i32, price: i64, stock: i32) {
        self.state.lock().await.products.insert(id, (price, stock));
    }

    pub async fn stock_of(&self, id: i32) -> Option<i32> {
        self.state
            .lock()
            .await
            .products
            .get(&id)
            .map(|&(_, stock)| stock)
    }
}

#[async_trait]
impl SaleRepositoryTrait for FakeSaleRepository {
    async fn checkout(
        &self,
        user_id: Option<i32>,
        customer_name: &str,
        customer_email: &str,
        lines: &[SaleLine],
    ) -> Result<(Sale, Vec<SaleItem>), RepositoryError> {
        let lines = merge_sale_lines(lines)?;
        let mut state = self.state.lock().await;

        let mut priced = Vec::with_capacity(lines.len());
        for line in &lines {
            let label = format!("#{}", line.product_id);
            let &(price, stock) = state
                .products
                .get(&line.product_id)
                .ok_or_else(|| StockError::ProductNotFound(label.clone()))?;
            ensure_units(StockKind::Product, &label, stock, line.quantity)?;
            priced.push((*line, price, line_subtotal(price, line.quantity)?));
        }

        let sale_id = next_id(state.sales.len());
        let mut items = Vec::with_capacity(priced.len());
        for (line, price, subtotal) in &priced {
            if let Some(entry) = state.products.get_mut(&line.product_id) {
                entry.1 -= line.quantity;
            }
            items.push(SaleItem {
                sale_item_id: next_id(state.items.len() + items.len()),
                sale_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: *price,
                subtotal: *subtotal,
            });
        }

        let sale = Sale {
            sale_id,
            user_id,
            customer_name: customer_name.to_string(),
            customer_email: customer_email.to_string(),
            total: priced.iter().map(|(_, _, subtotal)| subtotal).sum(),
            payment_status: PaymentStatus::Pendiente.as_str().to_string(),
            payment_reference: None,
            created_at: now(),
            updated_at: now(),
        };
        state.sales.push(sale.clone());
        state.items.extend(items.iter().cloned());

        Ok((sale, items))
    }

    async fn find_all(&self, req: &FindAllSales) -> Result<(Vec<Sale>, i64), RepositoryError> {
        let state = self.state.lock().await;
        let sales: Vec<Sale> = state
            .sales
            .iter()
            .filter(|s| req.payment_status.is_none_or(|p| s.payment_status == p.as_str()))
            .cloned()
            .collect();
        let total = sales.len() as i64;
        Ok((sales, total))
    }

    async fn find_by_id(
        &self,
        id: i32,
    ) -> Result<Option<(Sale, Vec<SaleItem>)>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.sales.iter().find(|s| s.sale_id == id).map(|sale| {
            let items = state
                .items
                .iter()
                .filter(|i| i.sale_id == id)
                .cloned()
                .collect();
            (sale.clone(), items)
        }))
    }

    async fn apply_payment(
        &self,
        sale_id: i32,
        status: PaymentStatus,
        payment_reference: &str,
    ) -> Result<PaymentOutcome, RepositoryError> {
        let mut state = self.state.lock().await;
        let index = state
            .sales
            .iter()
            .position(|s| s.sale_id == sale_id)
            .ok_or(RepositoryError::NotFound)?;

        let current = state.sales[index]
            .payment_status
            .parse::<PaymentStatus>()
            .map_err(RepositoryError::Custom)?;
        if current.is_final() || !status.is_final() {
            return Ok(PaymentOutcome {
                sale: state.sales[index].clone(),
                changed: false,
                restocked: Vec::new(),
            });
        }

        let mut restocked = Vec::new();
        if status == PaymentStatus::Rechazado {
            let returned: Vec<(i32, i32)> = state
                .items
                .iter()
                .filter(|i| i.sale_id == sale_id)
                .map(|i| (i.product_id, i.quantity))
                .collect();
            for (product_id, quantity) in returned {
                if let Some(entry) = state.products.get_mut(&product_id) {
                    entry.1 += quantity;
                    restocked.push(product_id);
                }
            }
        }

        let sale = &mut state.sales[index];
        sale.payment_status = status.as_str().to_string();
        sale.payment_reference = Some(payment_reference.to_string());
        sale.updated_at = now();

        Ok(PaymentOutcome {
            sale: sale.clone(),
            changed: true,
            restocked,
        })
    }
}

/// Backs both user repository traits.
#[derive(Default)]
pub struct FakeUserRepository {
    users: Mutex<Vec<User>>,
}

impl FakeUserRepository {
    pub async fn by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .await
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    pub async fn set_role(&self, id: i32, role: Role) {
        if let Some(user) = self.users.lock().await.iter_mut().find(|u| u.user_id == id) {
            user.role = role.as_str().to_string();
        }
    }

    async fn modify<F>(&self, id: i32, trashed: bool, change: F) -> Result<User, RepositoryError>
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|u| u.user_id == id && u.deleted_at.is_some() == trashed)
            .ok_or(RepositoryError::NotFound)?;
        change(user);
        user.updated_at = now();
        Ok(user.clone())
    }
}

#[async_trait]
impl UserQueryRepositoryTrait for FakeUserRepository {
    async fn find_all(
        &self,
        req: &FindAllUsers,
        scope: RecordScope,
    ) -> Result<(Vec<User>, i64), RepositoryError> {
        let users: Vec<User> = self
            .users
            .lock()
            .await
            .iter()
            .filter(|u| in_scope(u.deleted_at, scope))
            .filter(|u| req.search.is_empty() || u.email.contains(&req.search))
            .cloned()
            .collect();
        let total = users.len() as i64;
        Ok((users, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| u.user_id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.by_email(email).await.filter(|u| u.deleted_at.is_none()))
    }
}

#[async_trait]
impl UserCommandRepositoryTrait for FakeUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(RepositoryError::AlreadyExists(user.email.clone()));
        }

        let row = User {
            user_id: users.iter().map(|u| u.user_id).max().unwrap_or(0) + 1,
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            role: user.role.as_str().to_string(),
            store_name: user.store_name.clone(),
            created_at: now(),
            updated_at: now(),
            deleted_at: None,
        };
        users.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        req: &UpdateUserRequest,
        password: Option<String>,
    ) -> Result<User, RepositoryError> {
        self.modify(req.user_id, false, |user| {
            user.firstname = req.firstname.clone();
            user.lastname = req.lastname.clone();
            user.email = req.email.clone();
            user.store_name = req.store_name.clone();
            if let Some(hash) = password {
                user.password = hash;
            }
        })
        .await
    }

    async fn update_role(&self, id: i32, role: Role) -> Result<User, RepositoryError> {
        self.modify(id, false, |user| user.role = role.as_str().to_string())
            .await
    }

    async fn trash(&self, id: i32) -> Result<User, RepositoryError> {
        self.modify(id, false, |user| user.deleted_at = now()).await
    }

    async fn restore(&self, id: i32) -> Result<User, RepositoryError> {
        self.modify(id, true, |user| user.deleted_at = None).await
    }

    async fn delete_permanent(&self, id: i32) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().await;
        let index = users
            .iter()
            .position(|u| u.user_id == id && u.deleted_at.is_some())
            .ok_or(RepositoryError::NotFound)?;
        users.remove(index);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeRefreshTokenRepository {
    tokens: Mutex<Vec<RefreshToken>>,
}

impl FakeRefreshTokenRepository {
    pub async fn token_of(&self, user_id: i32) -> Option<String> {
        self.tokens
            .lock()
            .await
            .iter()
            .find(|t| t.user_id == user_id)
            .map(|t| t.token.clone())
    }
}

#[async_trait]
impl RefreshTokenRepositoryTrait for FakeRefreshTokenRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        let tokens = self.tokens.lock().await;
        Ok(tokens.iter().find(|t| t.token == token).cloned())
    }

    async fn upsert(
        &self,
        user_id: i32,
        token: &str,
        expired_date: NaiveDateTime,
    ) -> Result<RefreshToken, RepositoryError> {
        let mut tokens = self.tokens.lock().await;
        tokens.retain(|t| t.user_id != user_id);

        let row = RefreshToken {
            refresh_token_id: next_id(tokens.len()),
            user_id,
            token: token.to_string(),
            expired_date,
            created_at: now(),
            updated_at: now(),
        };
        tokens.push(row.clone());
        Ok(row)
    }

    async fn delete_by_user_id(&self, user_id: i32) -> Result<(), RepositoryError> {
        self.tokens.lock().await.retain(|t| t.user_id != user_id);
        Ok(())
    }
}

/// Backs both product repository traits.
#[derive(Default)]
pub struct FakeProductRepository {
    products: Mutex<Vec<Product>>,
}

impl FakeProductRepository {
    pub async fn insert(&self, name: &str, featured: bool) -> i32 {
        let mut products = self.products.lock().await;
        let id = products.iter().map(|p| p.product_id).max().unwrap_or(0) + 1;
        products.push(Product {
            product_id: id,
            name: name.to_string(),
            description: None,
            price: 150_000,
            stock: 3,
            width_cm: 80,
            height_cm: 200,
            material_id: None,
            filling_id: None,
            images: Vec::new(),
            featured,
            created_at: now(),
            updated_at: now(),
            deleted_at: None,
        });
        id
    }

    pub async fn is_empty(&self) -> bool {
        self.products.lock().await.is_empty()
    }

    async fn modify<F>(
        &self,
        id: i32,
        trashed: bool,
        change: F,
    ) -> Result<Product, RepositoryError>
    where
        F: FnOnce(&mut Product) + Send,
    {
        let mut products = self.products.lock().await;
        let product = products
            .iter_mut()
            .find(|p| p.product_id == id && p.deleted_at.is_some() == trashed)
            .ok_or(RepositoryError::NotFound)?;
        change(product);
        product.updated_at = now();
        Ok(product.clone())
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for FakeProductRepository {
    async fn find_all(
        &self,
        req: &FindAllProducts,
        scope: RecordScope,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let search = req.search.to_lowercase();
        let products: Vec<Product> = self
            .products
            .lock()
            .await
            .iter()
            .filter(|p| in_scope(p.deleted_at, scope))
            .filter(|p| search.is_empty() || p.name.to_lowercase().contains(&search))
            .cloned()
            .collect();
        let total = products.len() as i64;
        Ok((products, total))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .products
            .lock()
            .await
            .iter()
            .find(|p| p.product_id == id)
            .cloned())
    }

    async fn find_featured(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self
            .products
            .lock()
            .await
            .iter()
            .filter(|p| p.featured && p.deleted_at.is_none())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for FakeProductRepository {
    async fn create(&self, req: &CreateProductRequest) -> Result<Product, RepositoryError> {
        let id = self.insert(&req.name, req.featured).await;
        self.modify(id, false, |p| {
            p.description = req.description.clone();
            p.price = req.price;
            p.stock = req.stock;
            p.width_cm = req.width_cm;
            p.height_cm = req.height_cm;
            p.material_id = req.material_id;
            p.filling_id = req.filling_id;
            p.images = req.images.clone();
        })
        .await
    }

    async fn update(&self, req: &UpdateProductRequest) -> Result<Product, RepositoryError> {
        self.modify(req.id, false, |p| {
            p.name = req.name.clone();
            p.description = req.description.clone();
            p.price = req.price;
            p.stock = req.stock;
            p.width_cm = req.width_cm;
            p.height_cm = req.height_cm;
            p.material_id = req.material_id;
            p.filling_id = req.filling_id;
            p.images = req.images.clone();
        })
        .await
    }

    async fn set_featured(&self, id: i32, featured: bool) -> Result<Product, RepositoryError> {
        self.modify(id, false, |p| p.featured = featured).await
    }

    async fn trash(&self, id: i32) -> Result<Product, RepositoryError> {
        self.modify(id, false, |p| p.deleted_at = now()).await
    }

    async fn restore(&self, id: i32) -> Result<Product, RepositoryError> {
        self.modify(id, true, |p| p.deleted_at = None).await
    }

    async fn delete_permanent(&self, id: i32) -> Result<(), RepositoryError> {
        let mut products = self.products.lock().await;
        let index = products
            .iter()
            .position(|p| p.product_id == id && p.deleted_at.is_some())
            .ok_or(RepositoryError::NotFound)?;
        products.remove(index);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCatalogRepository {
    entries: Mutex<BTreeMap<(CatalogKind, i32), CatalogEntry>>,
}

#[async_trait]
impl CatalogRepositoryTrait for FakeCatalogRepository {
    async fn find_all(
        &self,
        kind: CatalogKind,
        req: &FindAllCatalog,
    ) -> Result<(Vec<CatalogEntry>, i64), RepositoryError> {
        let entries = self.entries.lock().await;
        let matching: Vec<CatalogEntry> = entries
            .iter()
            .filter(|((k, _), e)| *k == kind && e.name.contains(&req.search))
            .map(|(_, e)| e.clone())
            .collect();
        let total = matching.len() as i64;
        Ok((matching, total))
    }

    async fn find_by_id(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<Option<CatalogEntry>, RepositoryError> {
        Ok(self.entries.lock().await.get(&(kind, id)).cloned())
    }

    async fn create(
        &self,
        kind: CatalogKind,
        req: &CatalogItemRequest,
    ) -> Result<CatalogEntry, RepositoryError> {
        let mut entries = self.entries.lock().await;
        if entries
            .iter()
            .any(|((k, _), e)| *k == kind && e.name == req.name)
        {
            return Err(RepositoryError::AlreadyExists(format!(
                "{}_name_key",
                kind.table()
            )));
        }

        let entry = CatalogEntry {
            id: next_id(entries.len()),
            name: req.name.clone(),
            description: req.description.clone(),
            created_at: now(),
            updated_at: now(),
        };
        entries.insert((kind, entry.id), entry.clone());
        Ok(entry)
    }

    async fn update(
        &self,
        kind: CatalogKind,
        id: i32,
        req: &CatalogItemRequest,
    ) -> Result<CatalogEntry, RepositoryError> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .get_mut(&(kind, id))
            .ok_or(RepositoryError::NotFound)?;
        entry.name = req.name.clone();
        entry.description = req.description.clone();
        entry.updated_at = now();
        Ok(entry.clone())
    }

    async fn delete(&self, kind: CatalogKind, id: i32) -> Result<(), RepositoryError> {
        self.entries
            .lock()
            .await
            .remove(&(kind, id))
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Returns a fixed summary and records the threshold it was asked for.
#[derive(Default)]
pub struct FakeDashboardRepository {
    pub requested_threshold: Mutex<Option<i32>>,
}

#[async_trait]
impl DashboardRepositoryTrait for FakeDashboardRepository {
    async fn summary(
        &self,
        low_stock_threshold: i32,
    ) -> Result<DashboardResponse, RepositoryError> {
        *self.requested_threshold.lock().await = Some(low_stock_threshold);
        Ok(DashboardResponse {
            total_products: 3,
            orders_by_status: Vec::new(),
            pending_quotes: 1,
            low_stock_items: 2,
            approved_sales_total: 120_000,
        })
    }
}

pub const TEST_WEBHOOK_SECRET: &str = "whsec-test";

/// Whole HTTP stack over in-memory repositories.
pub struct TestApp {
    pub router: Router,
    pub jwt: DynJwtService,
    pub products: Arc<FakeProductRepository>,
    pub warehouse: Arc<FakeWarehouseRepository>,
    pub sales: Arc<FakeSaleRepository>,
}

pub async fn test_app() -> TestApp {
    let env = HashMap::from([
        ("DATABASE_URL", "postgres://unused".to_string()),
        ("JWT_SECRET", "router-secret".to_string()),
        ("RUN_MIGRATIONS", "false".to_string()),
        ("PORT", "0".to_string()),
        ("REDIS_HOST", "127.0.0.1".to_string()),
        ("MP_WEBHOOK_SECRET", TEST_WEBHOOK_SECRET.to_string()),
        (
            "UPLOAD_DIR",
            std::env::temp_dir()
                .join("mundopuertas-router-tests")
                .display()
                .to_string(),
        ),
    ]);
    let config = Config::from_source(|key| env.get(key).cloned()).unwrap();

    let users = Arc::new(FakeUserRepository::default());
    let products = Arc::new(FakeProductRepository::default());
    let warehouse = Arc::new(FakeWarehouseRepository::with_door("Puerta Roble", 10, 10));
    let sales = Arc::new(FakeSaleRepository::default());

    let repositories = Repositories {
        user_query: users.clone(),
        user_command: users,
        refresh_tokens: Arc::new(FakeRefreshTokenRepository::default()),
        catalog: Arc::new(FakeCatalogRepository::default()),
        product_query: products.clone(),
        product_command: products.clone(),
        warehouse: warehouse.clone(),
        order: Arc::new(FakeOrderRepository::default()),
        quote: Arc::new(FakeQuoteRepository::default()),
        sale: sales.clone(),
        notification: Arc::new(FakeNotificationRepository::default()),
        dashboard: Arc::new(FakeDashboardRepository::default()),
    };

    let state = AppState::new(&config, repositories, offline_cache())
        .await
        .unwrap();
    let jwt = state.jwt_config.clone();

    TestApp {
        router: AppRouter::build(state),
        jwt,
        products,
        warehouse,
        sales,
    }
}
