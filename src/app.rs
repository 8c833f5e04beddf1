use crate::environment::Environment;
use crate::error::{Error, Result};
use log::{debug, info};
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

crate::key! {
    pub Config = "config";
    pub Pool = "pool";
    pub Users = "users";
    pub Greeting = "greeter";
}

/// Every service the sample application is wired with, in binding order.
pub type AppEnv = crate::Env![
    Config => Settings,
    Pool => ConnectionPool,
    Users => UserStore,
    Greeting => Greeter,
];

/// What a consumer that only greets gets handed.
pub type GreeterEnv = crate::Env![Greeting => Greeter];

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub service_name: String,
    pub pool_size: usize,
    pub users: Vec<String>,
}

impl Settings {
    pub fn validate(self) -> Result<Self> {
        if self.service_name.trim().is_empty() {
            return Err(Error::Settings {
                message: "service name must not be empty".to_string(),
            });
        }

        if let Some(user) = self.users.iter().find(|user| user.trim().is_empty()) {
            return Err(Error::Settings {
                message: format!("invalid user name '{}'", user),
            });
        }

        Ok(self)
    }
}

#[derive(Debug)]
pub struct ConnectionPool {
    size: usize,
    in_use: AtomicUsize,
}

impl ConnectionPool {
    pub fn open(settings: &Settings) -> Result<Self> {
        if settings.pool_size == 0 {
            return Err(Error::PoolSize {
                size: settings.pool_size,
            });
        }

        debug!("opening pool with {} connections", settings.pool_size);
        Ok(ConnectionPool {
            size: settings.pool_size,
            in_use: AtomicUsize::new(0),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    pub fn checkout(&self) -> Result<Connection<'_>> {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.size).then_some(n + 1)
            })
            .map(|n| Connection { pool: self, id: n })
            .map_err(|_| Error::PoolExhausted { size: self.size })
    }
}

/// A checked out connection, returned to its pool on drop.
#[derive(Debug)]
pub struct Connection<'a> {
    pool: &'a ConnectionPool,
    id: usize,
}

impl Connection<'_> {
    pub fn id(&self) -> usize {
        self.id
    }
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        self.pool.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Known users and how often each was greeted.
#[derive(Debug)]
pub struct UserStore {
    pool: Arc<ConnectionPool>,
    visits: Mutex<BTreeMap<String, usize>>,
}

impl UserStore {
    pub fn new(pool: Arc<ConnectionPool>, users: &[String]) -> Self {
        let visits = users.iter().map(|user| (user.clone(), 0)).collect();
        UserStore {
            pool,
            visits: Mutex::new(visits),
        }
    }

    /// Records a visit and returns the user's visit count including it.
    pub fn visit(&self, name: &str) -> Result<usize> {
        let connection = self.pool.checkout()?;
        debug!("visit '{}' on connection {}", name, connection.id());

        let mut visits = self.visits.lock().map_err(|_| Error::Poisoned)?;
        let count = visits.get_mut(name).ok_or_else(|| Error::UnknownUser {
            name: name.to_string(),
        })?;
        *count += 1;
        Ok(*count)
    }

    pub fn names(&self) -> Result<Vec<String>> {
        let visits = self.visits.lock().map_err(|_| Error::Poisoned)?;
        Ok(visits.keys().cloned().collect())
    }
}

#[derive(Debug, Clone)]
pub struct Greeter {
    service_name: String,
    users: Arc<UserStore>,
    loud: bool,
}

impl Greeter {
    pub fn new(service_name: String, users: Arc<UserStore>) -> Self {
        Greeter {
            service_name,
            users,
            loud: false,
        }
    }

    pub fn loud(self) -> Self {
        Greeter { loud: true, ..self }
    }

    pub fn greet(&self, user: &str) -> Result<String> {
        let visits = self.users.visit(user)?;
        let greeting = format!(
            "{} says hello to {} (visit #{})",
            self.service_name, user, visits
        );

        Ok(if self.loud {
            greeting.to_uppercase()
        } else {
            greeting
        })
    }
}

pub fn wire(settings: Settings) -> Result<AppEnv> {
    let settings = settings.validate()?;

    let env = Environment::new()
        .bind(Config, settings)
        .try_bind_with(Pool, |env| ConnectionPool::open(env.get(Config)))?
        .bind_with(Users, |env| UserStore::new(env.share(Pool), &env.get(Config).users))
        .bind_with(Greeting, |env| {
            Greeter::new(env.get(Config).service_name.clone(), env.share(Users))
        });

    info!("wired {} services", env.len());
    debug!("{:?}", env);
    Ok(env)
}

/// Swaps the greeter for one that shouts.
pub fn shout(env: &AppEnv) -> AppEnv {
    env.rebind_with(Greeting, |env| env.get(Greeting).clone().loud())
}

pub fn greeter_only(env: &AppEnv) -> GreeterEnv {
    env.reduce_with(Greeting, |env| env.get(Greeting).clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            service_name: "desk".to_string(),
            pool_size: 2,
            users: vec!["ada".to_string(), "grace".to_string()],
        }
    }

    #[test]
    fn test_wire() -> Result<()> {
        let env = wire(settings())?;

        assert_eq!(env.keys(), vec!["config", "pool", "users", "greeter"]);
        assert_eq!(env.get(Config), &settings());
        assert_eq!(env.get(Pool).size(), 2);
        assert_eq!(env.get(Users).names()?, vec!["ada", "grace"]);

        Ok(())
    }

    #[test]
    fn test_services_share_dependencies() -> Result<()> {
        let env = wire(settings())?;

        assert_eq!(
            env.get(Greeting).greet("ada")?,
            "desk says hello to ada (visit #1)"
        );
        // The greeter holds the same store as the environment.
        assert_eq!(env.get(Users).visit("ada")?, 2);
        assert_eq!(
            env.get(Greeting).greet("ada")?,
            "desk says hello to ada (visit #3)"
        );

        Ok(())
    }

    #[test]
    fn test_unknown_user() -> Result<()> {
        let env = wire(settings())?;

        let err = env.get(Greeting).greet("linus");
        assert!(matches!(err, Err(Error::UnknownUser { name }) if name == "linus"));
        // The connection went back to the pool.
        assert_eq!(env.get(Pool).in_use(), 0);

        Ok(())
    }

    #[test]
    fn test_constructor_errors_propagate() {
        let zero = Settings {
            pool_size: 0,
            ..settings()
        };
        assert!(matches!(wire(zero), Err(Error::PoolSize { size: 0 })));

        let unnamed = Settings {
            service_name: "  ".to_string(),
            ..settings()
        };
        assert!(matches!(wire(unnamed), Err(Error::Settings { .. })));

        let blank_user = Settings {
            users: vec!["ada".to_string(), String::new()],
            ..settings()
        };
        assert!(matches!(wire(blank_user), Err(Error::Settings { .. })));
    }

    #[test]
    fn test_pool_checkout() -> Result<()> {
        let pool = ConnectionPool::open(&settings())?;

        let first = pool.checkout()?;
        let second = pool.checkout()?;
        assert_ne!(first.id(), second.id());
        assert_eq!(pool.in_use(), 2);
        assert!(matches!(
            pool.checkout(),
            Err(Error::PoolExhausted { size: 2 })
        ));

        drop(first);
        assert_eq!(pool.in_use(), 1);
        assert!(pool.checkout().is_ok());

        Ok(())
    }

    #[test]
    fn test_shout() -> Result<()> {
        let env = wire(settings())?;
        let loud = shout(&env);

        assert_eq!(
            loud.get(Greeting).greet("grace")?,
            "DESK SAYS HELLO TO GRACE (VISIT #1)"
        );
        assert_eq!(
            env.get(Greeting).greet("grace")?,
            "desk says hello to grace (visit #2)"
        );
        assert_eq!(loud.keys(), env.keys());

        Ok(())
    }

    #[test]
    fn test_greeter_only() -> Result<()> {
        let env = wire(settings())?;
        let reduced = greeter_only(&env);

        assert_eq!(reduced.keys(), vec!["greeter"]);
        assert_eq!(reduced.len(), 1);
        assert_eq!(
            reduced.get(Greeting).greet("ada")?,
            "desk says hello to ada (visit #1)"
        );
        assert_eq!(env.len(), 4);

        Ok(())
    }
}
